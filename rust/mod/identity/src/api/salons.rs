use axum::extract::{Extension, Path, State};
use axum::routing::post;
use axum::{Json, Router};

use salonhub_core::ServiceError;

use crate::api::AppState;
use crate::model::{CreateSalon, UpdateSalon};
use crate::provider::CallerIdentity;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/salons", post(create_salon))
        .route("/salons/{id}", axum::routing::patch(update_salon).delete(delete_salon))
}

/// POST /identity/salons — create a salon and assign its owner. Admin only.
async fn create_salon(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Json(input): Json<CreateSalon>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    let salon = svc
        .add_salon(&identity.id, input)
        .await
        .map_err(ServiceError::from)?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "id": salon.id,
            "message": "salon created",
        })),
    ))
}

/// PATCH /identity/salons/{id} — update fields and/or reassign the owner.
/// Admin only.
async fn update_salon(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(input): Json<UpdateSalon>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.update_salon(&identity.id, &id, input)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"message": "salon updated"})))
}

/// DELETE /identity/salons/{id} — remove a salon. Admin only.
async fn delete_salon(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_salon(&identity.id, &id)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"message": "salon deleted"})))
}

use axum::extract::{Extension, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use salonhub_core::ServiceError;

use crate::api::AppState;
use crate::provider::CallerIdentity;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(ensure_session))
        .route("/me", get(me).patch(update_me))
}

/// POST /identity/session — create-or-touch the caller's profile.
///
/// Called by clients after every successful login. Idempotent.
async fn ensure_session(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let profile = svc.ensure_profile(&identity).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(profile).unwrap()))
}

/// GET /identity/me — the caller's own profile, or null if absent.
async fn me(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let profile = svc
        .get_profile(&identity.id, None)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(profile).unwrap()))
}

/// PATCH /identity/me — partial update of the caller's own profile.
async fn update_me(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.update_profile(&identity.id, None, patch)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "profile updated",
    })))
}

use axum::extract::{Extension, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use salonhub_core::ServiceError;

use crate::api::AppState;
use crate::provider::CallerIdentity;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/search", get(search_profiles))
        .route("/profiles/{uid}", get(get_profile).patch(update_profile))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
}

/// GET /identity/profiles — the full directory. Admin only.
async fn list_profiles(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let profiles = svc
        .list_all_profiles(&identity.id)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"items": profiles})))
}

/// GET /identity/profiles/search?q=prefix — email prefix search. Admin only.
async fn search_profiles(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let results = svc
        .search_by_email(&identity.id, &params.q)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"items": results})))
}

/// GET /identity/profiles/{uid} — a profile, or null if absent.
/// Self, or admin for other accounts.
async fn get_profile(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(uid): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let profile = svc
        .get_profile(&identity.id, Some(&uid))
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(profile).unwrap()))
}

/// PATCH /identity/profiles/{uid} — partial update.
/// Self for plain fields; admin for other accounts or role changes.
async fn update_profile(
    State(svc): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(uid): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.update_profile(&identity.id, Some(&uid), patch)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "profile updated",
    })))
}

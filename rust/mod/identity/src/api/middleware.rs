use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use salonhub_core::ServiceError;

use crate::api::AppState;
use crate::provider::IdentityProvider;

/// Bearer-token authentication middleware.
///
/// Every identity route requires a verified caller. The token is handed
/// to the identity provider for verification; on success the resulting
/// [`crate::provider::CallerIdentity`] is stored as a request extension
/// for handlers to access via `Extension<CallerIdentity>`.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => {
            return ServiceError::Unauthenticated("missing authorization header".into())
                .into_response();
        }
    };

    match svc.provider().verify_token(&token).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

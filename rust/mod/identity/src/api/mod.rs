mod me;
mod middleware;
mod profiles;
mod salons;

use std::sync::Arc;

use axum::Router;

use crate::service::IdentityService;

/// Shared application state.
pub type AppState = Arc<IdentityService>;

/// Build the complete identity API router.
///
/// All routes are relative — the caller nests them under `/identity`.
/// Every route sits behind the bearer-token middleware; there are no
/// public identity endpoints.
pub fn build_router(svc: Arc<IdentityService>) -> Router {
    let api = Router::new()
        .merge(me::routes())
        .merge(profiles::routes())
        .merge(salons::routes());

    Router::new()
        .nest("/identity", api)
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::auth_middleware,
        ))
        .with_state(svc)
}

//! Identity module — per-account profiles + role-based access control +
//! salon ownership transfer.
//!
//! # Resources
//!
//! - **Profile** — one record per account, holding the account's role
//!   (`admin` / `customer`) and its salon relationships
//! - **Salon** — the owned resource; this module manages only its owner
//!   pointer and timestamps, everything else is plain CRUD
//!
//! Every entry point authenticates the caller through the pluggable
//! [`provider::IdentityProvider`], then consults the access guard before
//! touching the document store.
//!
//! # Usage
//!
//! ```ignore
//! use identity::{IdentityModule, service::IdentityConfig};
//!
//! let module = IdentityModule::new(store, provider, IdentityConfig::default());
//! let router = module.routes(); // Mount under /identity
//! ```

pub mod api;
pub mod model;
pub mod provider;
pub mod service;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

use axum::Router;

use salonhub_core::Module;
use salonhub_kv::DocStore;

use crate::provider::IdentityProvider;
use crate::service::{IdentityConfig, IdentityService};

/// Identity module implementing the Module trait.
///
/// Holds the IdentityService and provides HTTP routes for all identity
/// endpoints.
pub struct IdentityModule {
    service: Arc<IdentityService>,
}

impl IdentityModule {
    /// Create a new IdentityModule.
    pub fn new(
        store: Arc<dyn DocStore>,
        provider: Arc<dyn IdentityProvider>,
        config: IdentityConfig,
    ) -> Self {
        Self {
            service: IdentityService::new(store, provider, config),
        }
    }

    /// Get a reference to the underlying IdentityService.
    pub fn service(&self) -> &Arc<IdentityService> {
        &self.service
    }
}

impl Module for IdentityModule {
    fn name(&self) -> &str {
        "identity"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}

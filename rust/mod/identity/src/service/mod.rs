pub mod directory;
pub mod guard;
pub mod lifecycle;
pub mod mutator;
pub mod salon;

use std::sync::Arc;

use thiserror::Error;

use salonhub_kv::{DocStore, StoreError};

use crate::model::Profile;
use crate::provider::IdentityProvider;

/// Identity service error type.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<IdentityError> for salonhub_core::ServiceError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotFound(m) => salonhub_core::ServiceError::NotFound(m),
            IdentityError::Conflict(m) => salonhub_core::ServiceError::Conflict(m),
            IdentityError::Validation(m) => salonhub_core::ServiceError::Validation(m),
            IdentityError::Unauthenticated(m) => salonhub_core::ServiceError::Unauthenticated(m),
            IdentityError::PermissionDenied(m) => {
                salonhub_core::ServiceError::PermissionDenied(m)
            }
            IdentityError::Storage(m) => salonhub_core::ServiceError::Storage(m),
            IdentityError::Internal(m) => salonhub_core::ServiceError::Internal(m),
        }
    }
}

impl From<StoreError> for IdentityError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(k) => IdentityError::NotFound(k),
            StoreError::AlreadyExists(k) => IdentityError::Conflict(k),
            StoreError::Storage(m) => IdentityError::Storage(m),
            StoreError::Serialization(m) => IdentityError::Internal(m),
        }
    }
}

/// Configuration for the identity service.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Tenant/application identifier, prefixed onto every document key.
    /// Resolved once at process start and injected here — handlers never
    /// hardcode it.
    pub tenant: String,

    /// Display name assigned when a first login carries no name claim.
    pub placeholder_name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            tenant: "salonhub".to_string(),
            placeholder_name: "New User".to_string(),
        }
    }
}

/// The Identity service. Holds the document store, the identity provider
/// client, and configuration. Stateless per request: every handler fully
/// reads, decides, and writes within one call, so the store's
/// single-document atomicity is the only synchronization it needs.
pub struct IdentityService {
    pub(crate) store: Arc<dyn DocStore>,
    pub(crate) provider: Arc<dyn IdentityProvider>,
    pub(crate) config: IdentityConfig,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn DocStore>,
        provider: Arc<dyn IdentityProvider>,
        config: IdentityConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            provider,
            config,
        })
    }

    /// The identity provider, exposed for the auth middleware.
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    // ── Document keys ──

    pub(crate) fn profile_key(&self, uid: &str) -> String {
        format!("{}:profile:{}", self.config.tenant, uid)
    }

    pub(crate) fn profile_prefix(&self) -> String {
        format!("{}:profile:", self.config.tenant)
    }

    pub(crate) fn salon_key(&self, id: &str) -> String {
        format!("{}:salon:{}", self.config.tenant, id)
    }

    // ── Profile document access ──

    /// Read a profile, returning None if the account has no record.
    pub(crate) fn read_profile(&self, uid: &str) -> Result<Option<Profile>, IdentityError> {
        match self.store.get(&self.profile_key(uid))? {
            Some(doc) => serde_json::from_value(doc)
                .map(Some)
                .map_err(|e| IdentityError::Internal(format!("corrupt profile '{}': {}", uid, e))),
            None => Ok(None),
        }
    }

    /// Read a profile that must exist.
    pub(crate) fn load_profile(&self, uid: &str) -> Result<Profile, IdentityError> {
        self.read_profile(uid)?
            .ok_or_else(|| IdentityError::NotFound(format!("no profile record for '{}'", uid)))
    }

    /// Promote the configured bootstrap administrator, creating a stub
    /// profile if the account has never logged in here.
    ///
    /// Called once at process start; without it no admin could ever
    /// exist, since every promotion path requires an existing admin.
    pub async fn promote_bootstrap_admin(&self, email: &str) -> Result<String, IdentityError> {
        let uid = self.provider.lookup_by_email(email).await?;
        match self.read_profile(&uid)? {
            None => {
                let now = salonhub_core::now_rfc3339();
                let stub = serde_json::json!({
                    "id": uid,
                    "email": email,
                    "role": crate::model::Role::Admin,
                    "createdAt": now,
                });
                self.store.merge_create(&self.profile_key(&uid), &stub)?;
            }
            Some(profile) if !profile.role.is_admin() => {
                self.store.update(
                    &self.profile_key(&uid),
                    &serde_json::json!({
                        "role": crate::model::Role::Admin,
                        "updatedAt": salonhub_core::now_rfc3339(),
                    }),
                )?;
            }
            Some(_) => {}
        }
        Ok(uid)
    }

    /// Fetch a profile on behalf of a caller: self, or admin for others.
    /// Returns None (not an error) when the target has no record.
    pub fn get_profile(
        &self,
        caller_id: &str,
        target_id: Option<&str>,
    ) -> Result<Option<Profile>, IdentityError> {
        let target = target_id.unwrap_or(caller_id);
        self.require_self_or_admin(caller_id, target)?;
        self.read_profile(target)
    }
}

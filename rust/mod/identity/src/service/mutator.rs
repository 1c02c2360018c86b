//! Profile mutation — guarded partial updates with JSON merge-patch
//! semantics.

use serde_json::Value;
use tracing::warn;

use salonhub_core::now_rfc3339;
use salonhub_kv::DocStore;

use crate::model::{Profile, Role};
use crate::provider::IdentityProvider;
use crate::service::{IdentityError, IdentityService};

impl IdentityService {
    /// Apply a partial update to a profile.
    ///
    /// `target_id` defaults to the caller. Cross-account updates and
    /// role changes (even on one's own profile) require admin. `id`,
    /// `createdAt` and `lastLoginAt` are immutable through this path
    /// and silently dropped from the patch. Array fields are replaced
    /// wholesale, never merged element-wise.
    pub async fn update_profile(
        &self,
        caller_id: &str,
        target_id: Option<&str>,
        patch: Value,
    ) -> Result<Profile, IdentityError> {
        let target = target_id.unwrap_or(caller_id);
        let current = self.load_profile(target)?;

        if caller_id != target {
            self.require_admin(caller_id)?;
        }

        let mut patch = patch;
        let Some(obj) = patch.as_object_mut() else {
            return Err(IdentityError::Validation("patch must be a JSON object".into()));
        };

        // A role change is privileged even on self-update: a customer
        // must not be able to self-promote.
        if let Some(role_val) = obj.get("role") {
            let requested: Role = serde_json::from_value(role_val.clone()).map_err(|_| {
                IdentityError::Validation(format!("invalid role value: {}", role_val))
            })?;
            if requested != current.role {
                self.require_admin(caller_id)?;
            }
        }

        if let Some(v) = obj.get("photoURL") {
            if !v.is_string() && !v.is_null() {
                return Err(IdentityError::Validation(
                    "photoURL must be a string URL or null".into(),
                ));
            }
        }

        obj.remove("id");
        obj.remove("createdAt");
        obj.remove("lastLoginAt");
        obj.insert("updatedAt".into(), serde_json::json!(now_rfc3339()));

        self.store.update(&self.profile_key(target), &patch)?;
        let updated = self.load_profile(target)?;

        // Mirror changed display attributes to the identity provider.
        // Deliberately non-fatal: the profile document is the source of
        // truth, the mirrored copy is a convenience.
        let name_changed = updated.display_name != current.display_name;
        let photo_changed = updated.photo_url != current.photo_url;
        if name_changed || photo_changed {
            if let Err(e) = self
                .provider
                .update_display_attributes(
                    target,
                    updated.display_name.as_deref(),
                    updated.photo_url.as_deref(),
                )
                .await
            {
                warn!(
                    target_id = target,
                    error = %e,
                    "display attribute mirror failed; profile write kept"
                );
            }
        }

        Ok(updated)
    }
}

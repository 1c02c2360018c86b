//! Profile lifecycle — idempotent create-or-touch on login.

use salonhub_core::now_rfc3339;
use salonhub_kv::{DocStore, StoreError};

use crate::model::{Profile, Role};
use crate::provider::CallerIdentity;
use crate::service::{IdentityError, IdentityService};

impl IdentityService {
    /// Ensure a profile exists for a freshly authenticated caller.
    ///
    /// Existing profile: only `lastLoginAt` moves — stored fields are
    /// never overwritten by later logins, even when the provider's
    /// claims have changed since creation.
    ///
    /// Absent profile: a new customer record is written with a
    /// conditional create. Two concurrent first logins for the same
    /// account race on that create; the loser observes `AlreadyExists`
    /// and falls back to the touch path, so exactly one document is
    /// produced and `createdAt` never regresses.
    pub fn ensure_profile(&self, identity: &CallerIdentity) -> Result<Profile, IdentityError> {
        if identity.id.is_empty() {
            return Err(IdentityError::Unauthenticated(
                "no verified identity supplied".into(),
            ));
        }

        if let Some(existing) = self.read_profile(&identity.id)? {
            return self.touch_login(&identity.id, existing);
        }

        let now = now_rfc3339();
        let profile = Profile {
            id: identity.id.clone(),
            email: identity.email.clone(),
            display_name: Some(
                identity
                    .display_name
                    .clone()
                    .unwrap_or_else(|| self.config.placeholder_name.clone()),
            ),
            photo_url: identity.photo_url.clone(),
            phone_number: None,
            role: Role::Customer,
            created_at: now.clone(),
            last_login_at: Some(now),
            updated_at: None,
            owned_salons: Default::default(),
            associated_salons: Vec::new(),
            favorite_salons: Default::default(),
            address: None,
        };
        let doc = serde_json::to_value(&profile)
            .map_err(|e| IdentityError::Internal(e.to_string()))?;

        match self.store.create(&self.profile_key(&identity.id), &doc) {
            // Creation: return the record that was written, not a re-read.
            Ok(()) => Ok(profile),
            Err(StoreError::AlreadyExists(_)) => {
                // Lost a concurrent first-login race; the document exists
                // now, so this login becomes a touch.
                let existing = self.load_profile(&identity.id)?;
                self.touch_login(&identity.id, existing)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn touch_login(&self, uid: &str, mut profile: Profile) -> Result<Profile, IdentityError> {
        let now = now_rfc3339();
        self.store.update(
            &self.profile_key(uid),
            &serde_json::json!({ "lastLoginAt": now }),
        )?;
        profile.last_login_at = Some(now);
        Ok(profile)
    }
}

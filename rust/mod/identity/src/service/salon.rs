//! Salon CRUD and ownership transfer.
//!
//! Ownership transfer touches two documents without a cross-document
//! transaction, so ordering carries the invariant: the owner's profile
//! is read-or-created (and promoted) *first*, and only then does the
//! salon's owner pointer move. If the salon write fails after the
//! profile write, the operation errors but the profile write stays —
//! a retry is safe because the promotion is monotone and the owner
//! pointer is an overwrite.

use serde_json::json;
use tracing::warn;

use salonhub_core::{new_id, now_rfc3339};
use salonhub_kv::DocStore;

use crate::model::{CreateSalon, Role, Salon, UpdateSalon};
use crate::provider::IdentityProvider;
use crate::service::{IdentityError, IdentityService};

impl IdentityService {
    pub(crate) fn load_salon(&self, id: &str) -> Result<Salon, IdentityError> {
        let doc = self
            .store
            .get(&self.salon_key(id))?
            .ok_or_else(|| IdentityError::NotFound(format!("salon '{}' not found", id)))?;
        serde_json::from_value(doc)
            .map_err(|e| IdentityError::Internal(format!("corrupt salon '{}': {}", id, e)))
    }

    /// Create a salon and assign its owner. Admin only.
    pub async fn add_salon(
        &self,
        caller_id: &str,
        input: CreateSalon,
    ) -> Result<Salon, IdentityError> {
        self.require_admin(caller_id)?;
        if input.name.trim().is_empty() {
            return Err(IdentityError::Validation("salon name is required".into()));
        }

        let id = new_id();
        // Owner profile first, salon document second (see module docs).
        let owner_id = self.grant_ownership(&input.owner_email, &id).await?;

        let now = now_rfc3339();
        let salon = Salon {
            id: id.clone(),
            name: input.name,
            address: input.address,
            description: input.description,
            owner_id: Some(owner_id),
            owner_email: Some(input.owner_email),
            created_at: now.clone(),
            updated_at: Some(now),
        };
        let doc = serde_json::to_value(&salon)
            .map_err(|e| IdentityError::Internal(e.to_string()))?;
        self.store.set(&self.salon_key(&id), &doc)?;
        Ok(salon)
    }

    /// Update a salon's plain fields and, when `owner_email` is present,
    /// reassign its owner. Admin only.
    pub async fn update_salon(
        &self,
        caller_id: &str,
        id: &str,
        input: UpdateSalon,
    ) -> Result<Salon, IdentityError> {
        self.require_admin(caller_id)?;
        let current = self.load_salon(id)?;

        let mut patch = serde_json::Map::new();
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(IdentityError::Validation("salon name cannot be empty".into()));
            }
            patch.insert("name".into(), json!(name));
        }
        if let Some(address) = &input.address {
            patch.insert("address".into(), json!(address));
        }
        if let Some(description) = &input.description {
            patch.insert("description".into(), json!(description));
        }

        let mut new_owner_id = None;
        if let Some(owner_email) = &input.owner_email {
            // Owner profile first, salon pointer second.
            let owner_id = self.grant_ownership(owner_email, id).await?;
            patch.insert("ownerId".into(), json!(owner_id));
            patch.insert("ownerEmail".into(), json!(owner_email));
            new_owner_id = Some(owner_id);
        }

        patch.insert("updatedAt".into(), json!(now_rfc3339()));
        self.store
            .update(&self.salon_key(id), &serde_json::Value::Object(patch))?;

        // Retract the stale entry from the previous owner's ownedSalons.
        // Best-effort third write: a failure here leaves a stale set
        // entry, never a dangling owner pointer.
        if let Some(new_owner) = &new_owner_id {
            if let Some(previous) = current.owner_id.as_deref() {
                if previous != new_owner {
                    if let Err(e) = self.retract_ownership(previous, id) {
                        warn!(
                            salon_id = id,
                            previous_owner = previous,
                            error = %e,
                            "failed to retract previous owner's salon entry"
                        );
                    }
                }
            }
        }

        self.load_salon(id)
    }

    /// Delete a salon document. Admin only.
    pub fn delete_salon(&self, caller_id: &str, id: &str) -> Result<(), IdentityError> {
        self.require_admin(caller_id)?;
        // Load first so a missing salon is NotFound, not a silent no-op.
        let current = self.load_salon(id)?;
        self.store.delete(&self.salon_key(id))?;

        // Drop the salon from the owner's ownedSalons. Same best-effort
        // policy as reassignment: a failure leaves a stale set entry,
        // which must not undo the delete.
        if let Some(owner) = current.owner_id.as_deref() {
            if let Err(e) = self.retract_ownership(owner, id) {
                warn!(
                    salon_id = id,
                    owner_id = owner,
                    error = %e,
                    "failed to retract deleted salon from owner's profile"
                );
            }
        }
        Ok(())
    }

    /// Resolve `owner_email` and make sure the owner's profile exists,
    /// holds the owner role, and records the salon — before any salon
    /// write happens.
    ///
    /// Idempotent: repeating the call with the same inputs converges to
    /// the same profile state.
    async fn grant_ownership(
        &self,
        owner_email: &str,
        salon_id: &str,
    ) -> Result<String, IdentityError> {
        let owner_id = self.provider.lookup_by_email(owner_email).await?;

        match self.read_profile(&owner_id)? {
            None => {
                // Previously-unseen owner: minimal role-adjusted stub.
                // merge-create, so a concurrent first login cannot be
                // clobbered and a replayed transfer cannot duplicate.
                let now = now_rfc3339();
                let stub = json!({
                    "id": owner_id,
                    "email": owner_email,
                    "role": Role::Admin,
                    "createdAt": now,
                    "ownedSalons": [salon_id],
                });
                self.store
                    .merge_create(&self.profile_key(&owner_id), &stub)?;
            }
            Some(profile) => {
                // Read-then-replace of the whole set across two store
                // round trips: two concurrent transfers to the same
                // owner can lose one entry. Tolerated under the current
                // single-admin request model.
                let mut owned = profile.owned_salons.clone();
                owned.insert(salon_id.to_string());
                let mut patch = json!({
                    "ownedSalons": owned,
                    "updatedAt": now_rfc3339(),
                });
                if !profile.role.is_admin() {
                    // Monotone promotion: customer -> admin only, never
                    // downward, so a replay is a no-op.
                    patch["role"] = json!(Role::Admin);
                }
                self.store.update(&self.profile_key(&owner_id), &patch)?;
            }
        }

        Ok(owner_id)
    }

    fn retract_ownership(&self, owner_id: &str, salon_id: &str) -> Result<(), IdentityError> {
        let Some(profile) = self.read_profile(owner_id)? else {
            return Ok(());
        };
        if !profile.owned_salons.contains(salon_id) {
            return Ok(());
        }
        let owned: Vec<&String> = profile
            .owned_salons
            .iter()
            .filter(|s| s.as_str() != salon_id)
            .collect();
        self.store.update(
            &self.profile_key(owner_id),
            &json!({ "ownedSalons": owned, "updatedAt": now_rfc3339() }),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{CreateSalon, Role, UpdateSalon};
    use crate::service::IdentityError;
    use crate::testutil::TestHarness;

    fn create_input(owner_email: &str) -> CreateSalon {
        CreateSalon {
            name: "Shear Joy".into(),
            address: Some("1 High St".into()),
            description: None,
            owner_email: owner_email.into(),
        }
    }

    #[tokio::test]
    async fn add_salon_requires_admin() {
        let h = TestHarness::new();
        h.seed_customer("u1", "u1@x.com");
        let err = h
            .svc
            .add_salon("u1", create_input("u1@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn unknown_owner_email_is_not_found() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        let err = h
            .svc
            .add_salon("boss", create_input("nobody@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::NotFound(_)));
    }

    #[tokio::test]
    async fn new_owner_gets_stub_profile_with_owner_role() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        // Account exists at the provider but has never logged in here.
        h.provider.register("owner@x.com", "u-owner");

        let salon = h
            .svc
            .add_salon("boss", create_input("owner@x.com"))
            .await
            .unwrap();
        assert_eq!(salon.owner_id.as_deref(), Some("u-owner"));

        let owner = h.svc.load_profile("u-owner").unwrap();
        assert_eq!(owner.role, Role::Admin);
        assert_eq!(owner.email.as_deref(), Some("owner@x.com"));
        assert!(owner.owned_salons.contains(&salon.id));
        assert!(owner.last_login_at.is_none());
    }

    #[tokio::test]
    async fn existing_customer_owner_is_promoted() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.seed_customer("u1", "u1@x.com");
        h.provider.register("u1@x.com", "u1");

        let salon = h
            .svc
            .add_salon("boss", create_input("u1@x.com"))
            .await
            .unwrap();

        let owner = h.svc.load_profile("u1").unwrap();
        assert_eq!(owner.role, Role::Admin);
        assert!(owner.owned_salons.contains(&salon.id));
        // Promotion stamps updatedAt but never touches createdAt.
        assert!(owner.updated_at.is_some());
    }

    #[tokio::test]
    async fn transfer_is_idempotent_on_replay() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.seed_customer("u1", "u1@x.com");
        h.provider.register("u1@x.com", "u1");

        let salon = h
            .svc
            .add_salon("boss", create_input("u1@x.com"))
            .await
            .unwrap();

        // Replay the same assignment through update_salon.
        let replayed = h
            .svc
            .update_salon(
                "boss",
                &salon.id,
                UpdateSalon {
                    owner_email: Some("u1@x.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(replayed.owner_id.as_deref(), Some("u1"));

        let owner = h.svc.load_profile("u1").unwrap();
        assert_eq!(owner.role, Role::Admin);
        // Still exactly one entry for the salon.
        assert_eq!(
            owner.owned_salons.iter().filter(|s| **s == salon.id).count(),
            1
        );
    }

    #[tokio::test]
    async fn reassignment_moves_the_owned_salon_entry() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.seed_customer("u1", "u1@x.com");
        h.seed_customer("u2", "u2@x.com");
        h.provider.register("u1@x.com", "u1");
        h.provider.register("u2@x.com", "u2");

        let salon = h
            .svc
            .add_salon("boss", create_input("u1@x.com"))
            .await
            .unwrap();
        let updated = h
            .svc
            .update_salon(
                "boss",
                &salon.id,
                UpdateSalon {
                    owner_email: Some("u2@x.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.owner_id.as_deref(), Some("u2"));
        assert!(h.svc.load_profile("u2").unwrap().owned_salons.contains(&salon.id));
        assert!(!h.svc.load_profile("u1").unwrap().owned_salons.contains(&salon.id));
        // Reassignment never demotes the previous owner.
        assert_eq!(h.svc.load_profile("u1").unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn plain_field_update_keeps_owner() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.provider.register("owner@x.com", "u-owner");

        let salon = h
            .svc
            .add_salon("boss", create_input("owner@x.com"))
            .await
            .unwrap();
        let updated = h
            .svc
            .update_salon(
                "boss",
                &salon.id,
                UpdateSalon {
                    description: Some("Walk-ins welcome".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.owner_id.as_deref(), Some("u-owner"));
        assert_eq!(updated.description.as_deref(), Some("Walk-ins welcome"));
        assert!(updated.updated_at > salon.updated_at || updated.updated_at == salon.updated_at);
    }

    #[tokio::test]
    async fn delete_salon_checks_existence() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.provider.register("owner@x.com", "u-owner");

        let salon = h
            .svc
            .add_salon("boss", create_input("owner@x.com"))
            .await
            .unwrap();
        h.svc.delete_salon("boss", &salon.id).unwrap();
        let err = h.svc.delete_salon("boss", &salon.id).unwrap_err();
        assert!(matches!(err, IdentityError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_salon_retracts_owner_entry() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.provider.register("owner@x.com", "u-owner");

        let salon = h
            .svc
            .add_salon("boss", create_input("owner@x.com"))
            .await
            .unwrap();
        assert!(h.svc.load_profile("u-owner").unwrap().owned_salons.contains(&salon.id));

        h.svc.delete_salon("boss", &salon.id).unwrap();

        let owner = h.svc.load_profile("u-owner").unwrap();
        assert!(!owner.owned_salons.contains(&salon.id));
        // Retraction never demotes the owner.
        assert_eq!(owner.role, Role::Admin);
    }
}

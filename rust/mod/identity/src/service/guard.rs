//! Access guard — the single authorization gate every privileged
//! handler goes through.
//!
//! The guard reads the caller's own profile fresh on every call and
//! holds no cache, so authorization state is always current as of the
//! call. It never writes.

use crate::service::{IdentityError, IdentityService};

impl IdentityService {
    /// Allow only administrators.
    ///
    /// A caller with no profile record is denied rather than treated as
    /// an internal error: an account the system has never provisioned
    /// cannot hold the admin role.
    pub fn require_admin(&self, caller_id: &str) -> Result<(), IdentityError> {
        let profile = self.read_profile(caller_id)?.ok_or_else(|| {
            IdentityError::PermissionDenied("no profile record for caller".into())
        })?;
        if !profile.role.is_admin() {
            return Err(IdentityError::PermissionDenied(
                "administrator role required".into(),
            ));
        }
        Ok(())
    }

    /// Allow the target account holder themselves, or an administrator.
    ///
    /// Self-access short-circuits without a store read.
    pub fn require_self_or_admin(
        &self,
        caller_id: &str,
        target_id: &str,
    ) -> Result<(), IdentityError> {
        if caller_id == target_id {
            return Ok(());
        }
        self.require_admin(caller_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::service::IdentityError;
    use crate::testutil::TestHarness;

    #[test]
    fn admin_passes_customer_denied() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.seed_customer("u1", "u1@x.com");

        assert!(h.svc.require_admin("boss").is_ok());
        let err = h.svc.require_admin("u1").unwrap_err();
        assert!(matches!(err, IdentityError::PermissionDenied(_)));
    }

    #[test]
    fn caller_without_profile_is_denied_not_internal() {
        let h = TestHarness::new();
        let err = h.svc.require_admin("nobody").unwrap_err();
        assert!(matches!(err, IdentityError::PermissionDenied(_)));
    }

    #[test]
    fn self_access_short_circuits_without_a_profile() {
        let h = TestHarness::new();
        // No profile seeded at all — self access still passes.
        assert!(h.svc.require_self_or_admin("u1", "u1").is_ok());
        assert!(h.svc.require_self_or_admin("u1", "u2").is_err());
    }
}

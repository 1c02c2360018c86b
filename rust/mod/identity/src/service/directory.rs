//! Directory reads — admin-only bulk listing and email prefix search.

use salonhub_core::now_rfc3339;
use salonhub_kv::DocStore;

use crate::model::{Profile, ProfileSummary};
use crate::service::{IdentityError, IdentityService};

/// Upper bound appended to a search term for the `[term, term + hi)`
/// range scan. Sorts above every codepoint that can appear in an email.
const PREFIX_SCAN_SENTINEL: char = '\u{f8ff}';

/// Hard cap on email search results.
const SEARCH_RESULT_LIMIT: usize = 10;

/// Terms shorter than this never reach the store.
const MIN_SEARCH_TERM_CHARS: usize = 2;

impl IdentityService {
    /// Search profiles by email prefix. Admin only.
    ///
    /// Short terms return an empty list without a store round trip —
    /// a one-character prefix would be an expensive near-full scan.
    pub fn search_by_email(
        &self,
        caller_id: &str,
        term: &str,
    ) -> Result<Vec<ProfileSummary>, IdentityError> {
        self.require_admin(caller_id)?;

        if term.chars().count() < MIN_SEARCH_TERM_CHARS {
            return Ok(Vec::new());
        }

        let hi = format!("{}{}", term, PREFIX_SCAN_SENTINEL);
        let hits = self.store.scan_range(
            &self.profile_prefix(),
            "email",
            term,
            &hi,
            SEARCH_RESULT_LIMIT,
        )?;

        Ok(hits
            .into_iter()
            .map(|(_, doc)| {
                let id = doc
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let email = doc
                    .get("email")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let display_name = doc
                    .get("displayName")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| email.clone());
                ProfileSummary {
                    id,
                    email,
                    display_name,
                }
            })
            .collect())
    }

    /// List every profile. Admin only. Unpaginated — acceptable while
    /// the directory fits a single scan.
    pub fn list_all_profiles(&self, caller_id: &str) -> Result<Vec<Profile>, IdentityError> {
        self.require_admin(caller_id)?;

        let mut profiles = Vec::new();
        for (key, doc) in self.store.scan(&self.profile_prefix())? {
            let mut profile: Profile = serde_json::from_value(doc).map_err(|e| {
                IdentityError::Internal(format!("corrupt profile document '{}': {}", key, e))
            })?;
            if profile.created_at.is_empty() {
                // Should not occur under the creation invariants;
                // normalize rather than fail the whole listing.
                profile.created_at = now_rfc3339();
            }
            profiles.push(profile);
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use salonhub_kv::DocStore;

    use crate::service::IdentityError;
    use crate::testutil::TestHarness;

    #[test]
    fn search_requires_admin() {
        let h = TestHarness::new();
        h.seed_customer("u1", "u1@x.com");
        let err = h.svc.search_by_email("u1", "u1").unwrap_err();
        assert!(matches!(err, IdentityError::PermissionDenied(_)));
    }

    #[test]
    fn short_term_returns_empty_without_error() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        assert!(h.svc.search_by_email("boss", "a").unwrap().is_empty());
        assert!(h.svc.search_by_email("boss", "").unwrap().is_empty());
    }

    #[test]
    fn results_match_prefix_and_fall_back_to_email() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.seed_customer("u1", "ana@x.com");
        h.seed_customer("u2", "anders@x.com");
        h.seed_customer("u3", "bo@x.com");
        // u4 has no display name.
        h.seed_profile("u4", crate::model::Role::Customer, Some("anita@x.com"), None);

        let hits = h.svc.search_by_email("boss", "an").unwrap();
        assert_eq!(hits.len(), 3);
        for hit in &hits {
            assert!(hit.email.starts_with("an"));
        }
        let anita = hits.iter().find(|s| s.email == "anita@x.com").unwrap();
        assert_eq!(anita.display_name, "anita@x.com");
    }

    #[test]
    fn results_are_capped_at_ten() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        for i in 0..15 {
            h.seed_customer(&format!("u{}", i), &format!("user{:02}@x.com", i));
        }
        let hits = h.svc.search_by_email("boss", "user").unwrap();
        assert_eq!(hits.len(), 10);
    }

    #[test]
    fn list_all_requires_admin_and_tolerates_empty_directory() {
        let h = TestHarness::new();
        h.seed_customer("u1", "u1@x.com");
        assert!(matches!(
            h.svc.list_all_profiles("u1").unwrap_err(),
            IdentityError::PermissionDenied(_)
        ));

        let h2 = TestHarness::new();
        h2.seed_admin("boss", "boss@x.com");
        // Only the admin's own profile exists.
        let all = h2.svc.list_all_profiles("boss").unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn list_all_normalizes_missing_created_at() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        // A document missing createdAt entirely (should not occur, but
        // the listing must not fail on it).
        h.store
            .set(
                &h.svc.profile_key("legacy"),
                &serde_json::json!({"id": "legacy", "role": "customer"}),
            )
            .unwrap();

        let all = h.svc.list_all_profiles("boss").unwrap();
        let legacy = all.iter().find(|p| p.id == "legacy").unwrap();
        assert!(!legacy.created_at.is_empty());
    }

    #[test]
    fn salons_never_leak_into_the_profile_listing() {
        let h = TestHarness::new();
        h.seed_admin("boss", "boss@x.com");
        h.store
            .set(
                &h.svc.salon_key("s1"),
                &serde_json::json!({"id": "s1", "name": "Shear Joy", "createdAt": "2026-01-01T00:00:00+00:00"}),
            )
            .unwrap();

        let all = h.svc.list_all_profiles("boss").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "boss");
    }
}

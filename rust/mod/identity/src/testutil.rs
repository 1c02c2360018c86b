//! Shared test fixtures: an in-memory service harness and a scripted
//! identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use salonhub_core::now_rfc3339;
use salonhub_kv::{DocStore, MemoryStore};

use crate::model::{Profile, Role};
use crate::provider::{CallerIdentity, IdentityProvider};
use crate::service::{IdentityConfig, IdentityError, IdentityService};

/// Scripted identity provider: a fixed email directory, a token table,
/// and a record of every mirrored display-attribute update.
#[derive(Default)]
pub(crate) struct FakeProvider {
    directory: Mutex<HashMap<String, String>>,
    tokens: Mutex<HashMap<String, CallerIdentity>>,
    pub mirrored: Mutex<Vec<(String, Option<String>, Option<String>)>>,
    mirror_fails: AtomicBool,
}

impl FakeProvider {
    /// Register an account at the provider (email -> uid).
    pub fn register(&self, email: &str, uid: &str) {
        self.directory
            .lock()
            .unwrap()
            .insert(email.to_string(), uid.to_string());
    }

    /// Make a bearer token verify to the given identity.
    pub fn issue(&self, token: &str, identity: CallerIdentity) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), identity);
    }

    /// Make every subsequent mirror call fail.
    pub fn fail_mirror(&self) {
        self.mirror_fails.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::Unauthenticated("invalid token".into()))
    }

    async fn lookup_by_email(&self, email: &str) -> Result<String, IdentityError> {
        self.directory
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or_else(|| {
                IdentityError::NotFound(format!("no account found for email '{}'", email))
            })
    }

    async fn update_display_attributes(
        &self,
        uid: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), IdentityError> {
        if self.mirror_fails.load(Ordering::SeqCst) {
            return Err(IdentityError::Internal("provider unavailable".into()));
        }
        self.mirrored.lock().unwrap().push((
            uid.to_string(),
            display_name.map(str::to_string),
            photo_url.map(str::to_string),
        ));
        Ok(())
    }
}

/// An IdentityService wired to an in-memory store and a FakeProvider,
/// with handles on both for seeding and inspection.
pub(crate) struct TestHarness {
    pub svc: Arc<IdentityService>,
    pub store: Arc<MemoryStore>,
    pub provider: Arc<FakeProvider>,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(FakeProvider::default());
        let svc = IdentityService::new(
            store.clone(),
            provider.clone(),
            IdentityConfig::default(),
        );
        Self {
            svc,
            store,
            provider,
        }
    }

    /// Write a profile document directly, bypassing the service.
    pub fn seed_profile(
        &self,
        uid: &str,
        role: Role,
        email: Option<&str>,
        display_name: Option<&str>,
    ) {
        let now = now_rfc3339();
        let profile = Profile {
            id: uid.to_string(),
            email: email.map(str::to_string),
            display_name: display_name.map(str::to_string),
            photo_url: None,
            phone_number: None,
            role,
            created_at: now.clone(),
            last_login_at: Some(now),
            updated_at: None,
            owned_salons: Default::default(),
            associated_salons: Vec::new(),
            favorite_salons: Default::default(),
            address: None,
        };
        self.store
            .set(
                &self.svc.profile_key(uid),
                &serde_json::to_value(&profile).unwrap(),
            )
            .unwrap();
    }

    pub fn seed_customer(&self, uid: &str, email: &str) {
        self.seed_profile(uid, Role::Customer, Some(email), Some(uid));
    }

    pub fn seed_admin(&self, uid: &str, email: &str) {
        self.seed_profile(uid, Role::Admin, Some(email), Some(uid));
    }
}

/// A caller identity with the given id and email.
pub(crate) fn identity_of(id: &str, email: &str) -> CallerIdentity {
    CallerIdentity {
        id: id.to_string(),
        email: Some(email.to_string()),
        display_name: Some(format!("User {}", id)),
        photo_url: None,
    }
}

//! Pluggable identity provider — the external credential issuer.
//!
//! The module never stores credentials itself. It trusts the provider
//! for three things: verifying a bearer token into a [`CallerIdentity`],
//! resolving an email to an account id, and mirroring display attributes
//! back onto the provider's user record (best-effort).

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::service::IdentityError;

/// The verified identity of the current caller, as attested by the
/// identity provider. Injected into request extensions by the auth
/// middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Stable account identifier (token subject).
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub photo_url: Option<String>,
}

/// External identity provider interface.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer token and return the caller identity it attests.
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, IdentityError>;

    /// Resolve an email address to an account id.
    /// Fails with `NotFound` when no account matches.
    async fn lookup_by_email(&self, email: &str) -> Result<String, IdentityError>;

    /// Mirror display attributes onto the provider's user record.
    ///
    /// Best-effort from the caller's point of view: the profile document
    /// is the source of truth, this is a convenience copy.
    async fn update_display_attributes(
        &self,
        uid: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), IdentityError>;
}

/// Claims carried by provider-issued access tokens.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    /// Subject: account id.
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    picture: Option<String>,

    #[allow(dead_code)]
    iat: i64,

    #[allow(dead_code)]
    exp: i64,
}

/// Production provider: local JWT verification plus an HTTP client for
/// the provider's account directory API.
pub struct DirectoryProvider {
    jwt_secret: String,
    base_url: String,
    client: reqwest::Client,
}

impl DirectoryProvider {
    /// `base_url` is the account directory root, e.g.
    /// `https://accounts.internal/api/v1` (no trailing slash).
    pub fn new(jwt_secret: String, base_url: String) -> Self {
        Self {
            jwt_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for DirectoryProvider {
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| IdentityError::Unauthenticated(format!("invalid token: {}", e)))?;

        let claims = token_data.claims;
        Ok(CallerIdentity {
            id: claims.sub,
            email: claims.email,
            display_name: claims.name,
            photo_url: claims.picture,
        })
    }

    async fn lookup_by_email(&self, email: &str) -> Result<String, IdentityError> {
        let url = format!("{}/accounts/lookup", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| IdentityError::Internal(format!("account lookup failed: {}", e)))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::NotFound(format!(
                "no account found for email '{}'",
                email
            )));
        }
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(IdentityError::Internal(format!(
                "account lookup returned {}",
                status
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| IdentityError::Internal(format!("account lookup parse failed: {}", e)))?;
        body["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| IdentityError::Internal("missing id in lookup response".into()))
    }

    async fn update_display_attributes(
        &self,
        uid: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), IdentityError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = display_name {
            body.insert("displayName".into(), serde_json::json!(name));
        }
        if let Some(url) = photo_url {
            body.insert("photoURL".into(), serde_json::json!(url));
        }
        if body.is_empty() {
            return Ok(());
        }

        let url = format!("{}/accounts/{}", self.base_url, uid);
        let resp = self
            .client
            .patch(&url)
            .json(&serde_json::Value::Object(body))
            .send()
            .await
            .map_err(|e| IdentityError::Internal(format!("attribute mirror failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(IdentityError::Internal(format!(
                "attribute mirror returned {}",
                status
            )));
        }
        Ok(())
    }
}

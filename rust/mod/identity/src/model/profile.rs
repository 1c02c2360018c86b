use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Account role.
///
/// `Customer` is the default on creation. The only transitions are
/// `customer → admin` and `admin → customer`, and only through an
/// authorized mutation (admin-driven update or ownership transfer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Optional postal address nested in a profile. No independent lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Secondary employment-style relationship between an account and a salon.
///
/// `salon_id` is unique across entries with no `end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalonAssociation {
    pub salon_id: String,

    /// Role at the salon (e.g. "stylist", "receptionist"). Opaque here.
    pub role: String,

    /// RFC 3339 date the association started.
    pub start_date: String,

    /// RFC 3339 date the association ended; absent while active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// A per-account profile record, keyed by the provider-assigned account id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Stable account identifier. Assigned by the identity provider,
    /// never regenerated.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub role: Role,

    /// RFC 3339 creation timestamp. Set exactly once, never overwritten.
    #[serde(default)]
    pub created_at: String,

    /// RFC 3339 timestamp of the most recent login touch. Absent on
    /// stub profiles created by an ownership transfer before the owner
    /// ever logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,

    /// RFC 3339 timestamp of the last mutation; absent until the first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Salons this account owns.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub owned_salons: BTreeSet<String>,

    /// Secondary employment relationships.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_salons: Vec<SalonAssociation>,

    /// Salons this account has favorited.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub favorite_salons: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Projection returned by the admin email search. Restricted to three
/// fields so a directory search never exposes other account data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub email: String,
    /// Falls back to the email when the profile has no display name.
    pub display_name: String,
}

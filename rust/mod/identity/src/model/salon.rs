use serde::{Deserialize, Serialize};

/// A salon — the owned resource. Only the owner pointer and timestamps
/// carry identity semantics; the descriptive fields are plain CRUD.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salon {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Account id of the owner. Maintained by the ownership transfer
    /// path; the matching profile always exists before this is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Email the owner was last resolved from. Kept for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Input for creating a new salon. Owner assignment is mandatory at
/// creation so no salon ever exists without a resolvable owner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalon {
    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    pub owner_email: String,
}

/// Partial update to a salon. A present `owner_email` triggers the
/// ownership transfer path; the rest are plain field merges.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalon {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub owner_email: Option<String>,
}

use serde::{Deserialize, Serialize};

/// Lifecycle bucket of a credential record.
///
/// Transitions are unrestricted: any status can be reached from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Archived,
    #[serde(alias = "trash")]
    Trashed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Archived => "archived",
            RecordStatus::Trashed => "trashed",
        }
    }

    /// Parses a status name, accepting the legacy `trash` spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(RecordStatus::Active),
            "archived" => Some(RecordStatus::Archived),
            "trashed" | "trash" => Some(RecordStatus::Trashed),
            _ => None,
        }
    }
}

/// A single stored credential entry.
///
/// `id` and `created_at` are assigned by the store and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub id: String,
    pub account: String,
    pub username: String,
    #[serde(alias = "password")]
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,
    #[serde(default)]
    pub status: RecordStatus,
}

/// Fields supplied by the caller when creating a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCredential {
    pub account: String,
    pub username: String,
    #[serde(alias = "password")]
    pub secret: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl NewCredential {
    pub fn new(account: &str, username: &str, secret: &str) -> Self {
        Self {
            account: account.to_string(),
            username: username.to_string(),
            secret: secret.to_string(),
            details: None,
            labels: None,
        }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = Some(labels.iter().map(|l| l.to_string()).collect());
        self
    }
}

/// Partial update applied to an existing record.
///
/// Unset fields keep their prior value. `labels`, when set, replaces the
/// record's labels wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPatch {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "password")]
    pub secret: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
}

impl CredentialPatch {
    pub fn is_empty(&self) -> bool {
        self.account.is_none()
            && self.username.is_none()
            && self.secret.is_none()
            && self.details.is_none()
            && self.labels.is_none()
            && self.status.is_none()
    }
}

/// Removes duplicate label names, keeping the first occurrence of each.
pub fn dedup_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

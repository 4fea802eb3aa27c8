use serde::{Deserialize, Serialize};

use super::credential::CredentialRecord;

/// Labels every fresh store starts with.
pub const DEFAULT_LABELS: [&str; 2] = ["Work", "Personal"];

/// Display theme preference persisted with the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

/// The complete durable state of the application.
///
/// Always persisted as a whole; there is no incremental format. Decoding
/// accepts the field names of the legacy blob (`passwords`, `autoBackup`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default, alias = "passwords")]
    pub records: Vec<CredentialRecord>,
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    #[serde(default, alias = "autoBackup")]
    pub auto_backup_enabled: bool,
    #[serde(default)]
    pub theme_mode: ThemeMode,
}

fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            labels: default_labels(),
            auto_backup_enabled: false,
            theme_mode: ThemeMode::default(),
        }
    }
}

impl StoreSnapshot {
    pub fn find(&self, id: &str) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

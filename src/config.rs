//! Runtime configuration for RedBlue.
//!
//! Everything comes from environment variables; unset or empty variables fall
//! back to defaults. [`AppConfig::from_lookup`] takes the lookup as a closure
//! so configuration can be built without touching the process environment.

use std::path::PathBuf;

use crate::platform;
use crate::services::persistence::DEFAULT_STORAGE_KEY;

/// Name of the SQLite file inside the data directory.
pub const DATABASE_FILE_NAME: &str = "redblue.db";

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Connection settings for a hosted Supabase project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub supabase: Option<SupabaseConfig>,
    pub log_filter: String,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// - `REDBLUE_DATA_DIR`: data directory (platform data dir otherwise)
    /// - `REDBLUE_STORAGE_KEY`: key the snapshot is stored under
    /// - `SUPABASE_URL` / `SUPABASE_ANON_KEY`: hosted identity provider; the
    ///   `EXPO_PUBLIC_` prefixed names are accepted too
    /// - `REDBLUE_LOG`: `tracing` filter directive
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let data_dir = get(&["REDBLUE_DATA_DIR"])
            .map(PathBuf::from)
            .unwrap_or_else(platform::get_data_dir);
        let storage_key =
            get(&["REDBLUE_STORAGE_KEY"]).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        let url = get(&["SUPABASE_URL", "EXPO_PUBLIC_SUPABASE_URL"]);
        let anon_key = get(&["SUPABASE_ANON_KEY", "EXPO_PUBLIC_SUPABASE_ANON_KEY"]);
        let supabase = match (url, anon_key) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig { url, anon_key }),
            _ => None,
        };

        let log_filter = get(&["REDBLUE_LOG"]).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self { data_dir, storage_key, supabase, log_filter }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

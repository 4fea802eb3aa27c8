//! Export and share helpers.
//!
//! Renders a single record as a printable HTML document and copies the raw
//! persisted database blob to a backup file. Handing the produced file to a
//! platform share sheet is the front-end's job.

use std::fs;
use std::path::{Path, PathBuf};

use crate::database::kv_store::KeyValueStore;
use crate::types::credential::CredentialRecord;
use crate::types::errors::ExportError;

/// File name used for database backups.
pub const BACKUP_FILE_NAME: &str = "passwords-backup.json";

/// Trait defining export operations.
pub trait ExportServiceTrait {
    fn render_record_document(&self, record: &CredentialRecord) -> String;
    fn export_record(&self, record: &CredentialRecord, dir: &Path) -> Result<PathBuf, ExportError>;
    fn share_database(
        &self,
        kv: &dyn KeyValueStore,
        key: &str,
        dir: &Path,
    ) -> Result<PathBuf, ExportError>;
    fn read_backup(&self, path: &Path) -> Result<String, ExportError>;
}

/// Export service writing plain files.
#[derive(Debug, Default, Clone)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lowercase ASCII slug of `value`, `record` when nothing usable remains.
fn slug(value: &str) -> String {
    let mut out = String::new();
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "record".to_string()
    } else {
        trimmed.to_string()
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ExportError::FileSystemError(format!("Failed to create export directory: {}", e))
        })?;
    }
    fs::write(path, contents).map_err(|e| {
        ExportError::FileSystemError(format!("Failed to write {}: {}", path.display(), e))
    })
}

impl ExportServiceTrait for ExportService {
    fn render_record_document(&self, record: &CredentialRecord) -> String {
        format!(
            "<html>\n<body style=\"font-family: -apple-system, Roboto, Arial; padding: 24px;\">\n  \
             <h2>Account: {}</h2>\n  \
             <p><b>Username:</b> {}</p>\n  \
             <p><b>Password:</b> {}</p>\n  \
             <small>Generated by RedBlue Passwords</small>\n\
             </body>\n</html>\n",
            escape_html(&record.account),
            escape_html(&record.username),
            escape_html(&record.secret),
        )
    }

    /// Writes the record's document to `<dir>/<account-slug>-<id>.html`.
    fn export_record(&self, record: &CredentialRecord, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(format!("{}-{}.html", slug(&record.account), slug(&record.id)));
        write_file(&path, &self.render_record_document(record))?;
        Ok(path)
    }

    /// Copies the raw blob stored under `key` to `<dir>/passwords-backup.json`.
    ///
    /// Writes `{}` when nothing has been persisted yet.
    fn share_database(
        &self,
        kv: &dyn KeyValueStore,
        key: &str,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let raw = kv.get(key)?.unwrap_or_else(|| "{}".to_string());
        let path = dir.join(BACKUP_FILE_NAME);
        write_file(&path, &raw)?;
        Ok(path)
    }

    fn read_backup(&self, path: &Path) -> Result<String, ExportError> {
        fs::read_to_string(path).map_err(|e| {
            ExportError::FileSystemError(format!("Failed to read {}: {}", path.display(), e))
        })
    }
}

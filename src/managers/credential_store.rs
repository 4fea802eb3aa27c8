//! Credential Store for RedBlue.
//!
//! Sole owner of the credential records, the label set and the preference
//! flags. Every mutation swaps in a new immutable snapshot and hands it to the
//! persist queue; reads go through [`CredentialStore::snapshot`] or
//! [`CredentialStore::filtered_view`].

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};
use uuid::Uuid;

use crate::database::kv_store::KeyValueStore;
use crate::services::persistence::{
    self, ignore_faults, FaultObserver, LoadOutcome, PersistQueue, SEARCH_HISTORY_KEY,
};
use crate::types::credential::{
    dedup_labels, CredentialPatch, CredentialRecord, NewCredential, RecordStatus,
};
use crate::types::errors::StoreError;
use crate::types::snapshot::{StoreSnapshot, ThemeMode};

/// Trait defining credential store operations.
pub trait CredentialStoreTrait {
    fn load(&mut self) -> LoadOutcome;
    fn add(&mut self, fields: NewCredential) -> Result<CredentialRecord, StoreError>;
    fn update(&mut self, id: &str, patch: CredentialPatch) -> Result<(), StoreError>;
    fn move_to(&mut self, id: &str, status: RecordStatus) -> Result<(), StoreError>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
    fn add_label(&mut self, name: &str) -> Result<bool, StoreError>;
    fn set_auto_backup(&mut self, enabled: bool);
    fn set_theme_mode(&mut self, mode: ThemeMode);
    fn filtered_view(&self, status: RecordStatus, query: &str) -> FilteredView<'_>;
    fn snapshot(&self) -> Arc<StoreSnapshot>;
    fn get(&self, id: &str) -> Option<&CredentialRecord>;
}

/// Credential store persisting whole snapshots through a [`KeyValueStore`].
pub struct CredentialStore {
    snapshot: Arc<StoreSnapshot>,
    kv: Arc<dyn KeyValueStore>,
    storage_key: String,
    observer: FaultObserver,
    queue: PersistQueue,
}

impl CredentialStore {
    /// Creates a store with default in-memory state. Call `load` before
    /// accepting mutations.
    pub fn new(kv: Arc<dyn KeyValueStore>, storage_key: &str) -> Self {
        Self::with_fault_observer(kv, storage_key, ignore_faults())
    }

    /// Like [`CredentialStore::new`], delivering load and persist faults to `observer`.
    pub fn with_fault_observer(
        kv: Arc<dyn KeyValueStore>,
        storage_key: &str,
        observer: FaultObserver,
    ) -> Self {
        let queue = PersistQueue::spawn(kv.clone(), storage_key, observer.clone());
        Self {
            snapshot: Arc::new(StoreSnapshot::default()),
            kv,
            storage_key: storage_key.to_string(),
            observer,
            queue,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn records(&self) -> &[CredentialRecord] {
        &self.snapshot.records
    }

    pub fn labels(&self) -> &[String] {
        &self.snapshot.labels
    }

    pub fn auto_backup_enabled(&self) -> bool {
        self.snapshot.auto_backup_enabled
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.snapshot.theme_mode
    }

    /// Replaces the whole state with the snapshot in `blob` and persists it.
    ///
    /// Nothing is merged. A blob that does not decode leaves state untouched.
    pub fn restore_from_backup(&mut self, blob: &str) -> Result<(), StoreError> {
        let restored = persistence::decode_snapshot(blob).map_err(StoreError::InvalidBackup)?;
        info!(records = restored.records.len(), "restoring store from backup");
        self.snapshot = Arc::new(restored);
        self.persist();
        Ok(())
    }

    /// Forgets the list screen's search history.
    pub fn clear_search_history(&self) {
        self.queue.remove(SEARCH_HISTORY_KEY);
    }

    /// Blocks until every persist issued so far has reached storage.
    pub fn flush(&self) {
        self.queue.flush();
    }

    fn persist(&self) {
        self.queue.persist(self.snapshot.clone());
    }

    fn state_mut(&mut self) -> &mut StoreSnapshot {
        Arc::make_mut(&mut self.snapshot)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.snapshot
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.snapshot.find(&id).is_none() {
                return id;
            }
        }
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

fn require(field: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(field.to_string()));
    }
    Ok(())
}

impl CredentialStoreTrait for CredentialStore {
    /// Loads the persisted snapshot, falling back to defaults when it is
    /// absent or unreadable. Never fails.
    fn load(&mut self) -> LoadOutcome {
        let (snapshot, outcome) =
            persistence::load_snapshot(self.kv.as_ref(), &self.storage_key, &self.observer);
        self.snapshot = Arc::new(snapshot);
        outcome
    }

    fn add(&mut self, fields: NewCredential) -> Result<CredentialRecord, StoreError> {
        require("account", &fields.account)?;
        require("username", &fields.username)?;
        require("secret", &fields.secret)?;

        let record = CredentialRecord {
            id: self.fresh_id(),
            account: fields.account,
            username: fields.username,
            secret: fields.secret,
            details: fields.details,
            labels: dedup_labels(fields.labels.unwrap_or_default()),
            created_at: Self::now_ms(),
            status: RecordStatus::Active,
        };

        self.state_mut().records.insert(0, record.clone());
        debug!(id = %record.id, "credential added");
        self.persist();
        Ok(record)
    }

    fn update(&mut self, id: &str, patch: CredentialPatch) -> Result<(), StoreError> {
        let index = self.position(id)?;
        if patch.is_empty() {
            return Ok(());
        }
        let record = &mut self.state_mut().records[index];

        if let Some(account) = patch.account {
            record.account = account;
        }
        if let Some(username) = patch.username {
            record.username = username;
        }
        if let Some(secret) = patch.secret {
            record.secret = secret;
        }
        if let Some(details) = patch.details {
            record.details = Some(details);
        }
        if let Some(labels) = patch.labels {
            record.labels = dedup_labels(labels);
        }
        if let Some(status) = patch.status {
            record.status = status;
        }

        debug!(id, "credential updated");
        self.persist();
        Ok(())
    }

    fn move_to(&mut self, id: &str, status: RecordStatus) -> Result<(), StoreError> {
        let index = self.position(id)?;
        self.state_mut().records[index].status = status;
        debug!(id, status = status.as_str(), "credential moved");
        self.persist();
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self.position(id)?;
        self.state_mut().records.remove(index);
        debug!(id, "credential deleted");
        self.persist();
        Ok(())
    }

    /// Appends a label unless an identical name already exists.
    ///
    /// Returns whether the label set changed. Surrounding whitespace is
    /// trimmed before comparison.
    fn add_label(&mut self, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        require("label", name)?;
        if self.snapshot.has_label(name) {
            return Ok(false);
        }
        self.state_mut().labels.push(name.to_string());
        debug!(label = name, "label added");
        self.persist();
        Ok(true)
    }

    fn set_auto_backup(&mut self, enabled: bool) {
        self.state_mut().auto_backup_enabled = enabled;
        self.persist();
    }

    fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.state_mut().theme_mode = mode;
        self.persist();
    }

    fn filtered_view(&self, status: RecordStatus, query: &str) -> FilteredView<'_> {
        FilteredView {
            records: self.snapshot.records.iter(),
            status,
            needle: query.to_lowercase(),
        }
    }

    fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.snapshot.clone()
    }

    fn get(&self, id: &str) -> Option<&CredentialRecord> {
        self.snapshot.find(id)
    }
}

/// Lazily filtered, read-only walk over the store's records.
///
/// Yields records with the requested status whose `account` and `username`,
/// joined by a space, contain the query case-insensitively. An empty query
/// matches every record with that status.
pub struct FilteredView<'a> {
    records: std::slice::Iter<'a, CredentialRecord>,
    status: RecordStatus,
    needle: String,
}

fn view_matches(record: &CredentialRecord, status: RecordStatus, needle: &str) -> bool {
    if record.status != status {
        return false;
    }
    if needle.is_empty() {
        return true;
    }
    format!("{} {}", record.account, record.username)
        .to_lowercase()
        .contains(needle)
}

impl<'a> Iterator for FilteredView<'a> {
    type Item = &'a CredentialRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let status = self.status;
        let needle = &self.needle;
        self.records.find(|record| view_matches(record, status, needle))
    }
}

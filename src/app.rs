//! App Core for RedBlue.
//!
//! Builds the credential store, the identity provider and the export service
//! once at start and hands them out by reference. The store is only reachable
//! through [`App::store`] / [`App::store_mut`] while a session is active.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::info;

use crate::config::AppConfig;
use crate::database::connection::Database;
use crate::database::kv_store::{KeyValueStore, SqliteKeyValueStore};
use crate::managers::credential_store::{CredentialStore, CredentialStoreTrait};
use crate::services::export_service::{ExportService, ExportServiceTrait};
use crate::services::identity::{IdentityProvider, InMemoryIdentity};
use crate::services::persistence::{FaultObserver, LoadOutcome};
use crate::types::errors::{ExportError, PersistenceFault};
use crate::types::identity::Session;

/// Central application struct holding the store and its collaborators.
pub struct App {
    pub store: CredentialStore,
    pub identity: Arc<dyn IdentityProvider>,
    pub export: ExportService,
    kv: Arc<dyn KeyValueStore>,
    export_dir: PathBuf,
    session: watch::Receiver<Option<Session>>,
    last_fault: Arc<Mutex<Option<PersistenceFault>>>,
    load_outcome: LoadOutcome,
}

impl App {
    /// Opens the SQLite database from `config`, picks the identity provider
    /// and loads the store.
    pub fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(config.database_path())?);
        let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(db));
        let identity = Self::identity_from_config(config);
        Ok(Self::with_parts(kv, &config.storage_key, identity, config.export_dir()))
    }

    /// Assembles an app from already-built parts and loads the store.
    pub fn with_parts(
        kv: Arc<dyn KeyValueStore>,
        storage_key: &str,
        identity: Arc<dyn IdentityProvider>,
        export_dir: PathBuf,
    ) -> Self {
        let last_fault = Arc::new(Mutex::new(None));
        let sink = last_fault.clone();
        let observer: FaultObserver = Arc::new(move |fault: &PersistenceFault| {
            let mut slot = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *slot = Some(fault.clone());
        });

        let mut store = CredentialStore::with_fault_observer(kv.clone(), storage_key, observer);
        let load_outcome = store.load();
        let session = identity.subscribe();

        Self {
            store,
            identity,
            export: ExportService::new(),
            kv,
            export_dir,
            session,
            last_fault,
            load_outcome,
        }
    }

    #[cfg(feature = "supabase")]
    fn identity_from_config(config: &AppConfig) -> Arc<dyn IdentityProvider> {
        use crate::services::identity::SupabaseIdentity;
        match &config.supabase {
            Some(supabase) => {
                info!(url = %supabase.url, "using Supabase identity provider");
                Arc::new(SupabaseIdentity::new(&supabase.url, &supabase.anon_key))
            }
            None => {
                info!("no identity provider configured, using in-memory accounts");
                Arc::new(InMemoryIdentity::new())
            }
        }
    }

    #[cfg(not(feature = "supabase"))]
    fn identity_from_config(_config: &AppConfig) -> Arc<dyn IdentityProvider> {
        info!("built without Supabase support, using in-memory accounts");
        Arc::new(InMemoryIdentity::new())
    }

    pub fn has_session(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// The store, if a user is signed in.
    pub fn store(&self) -> Option<&CredentialStore> {
        if self.has_session() {
            Some(&self.store)
        } else {
            None
        }
    }

    /// Mutable access to the store, if a user is signed in.
    pub fn store_mut(&mut self) -> Option<&mut CredentialStore> {
        if self.has_session() {
            Some(&mut self.store)
        } else {
            None
        }
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Most recent persistence fault, if any occurred.
    pub fn last_fault(&self) -> Option<PersistenceFault> {
        self.last_fault.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Writes the persisted database blob to the export directory.
    ///
    /// Pending writes are flushed first so the file reflects every mutation.
    pub fn share_database(&self) -> Result<PathBuf, ExportError> {
        self.store.flush();
        self.export
            .share_database(self.kv.as_ref(), self.store.storage_key(), &self.export_dir)
    }

    /// Writes one record's printable document to the export directory.
    ///
    /// Returns `Ok(None)` when no record has that id.
    pub fn export_record(&self, id: &str) -> Result<Option<PathBuf>, ExportError> {
        match self.store.get(id) {
            Some(record) => self.export.export_record(record, &self.export_dir).map(Some),
            None => Ok(None),
        }
    }

    /// Flushes pending writes before the process exits.
    pub fn shutdown(&self) {
        self.store.flush();
    }
}

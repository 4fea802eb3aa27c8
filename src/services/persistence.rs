//! Snapshot persistence for the credential store.
//!
//! Snapshots are encoded as JSON and written whole under a single key. Writes
//! run on a dedicated worker thread so mutations never wait on I/O. The worker
//! drains its queue before writing and only writes the newest snapshot, so an
//! older snapshot can never land after a newer one.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::database::kv_store::KeyValueStore;
use crate::types::credential::dedup_labels;
use crate::types::errors::PersistenceFault;
use crate::types::snapshot::StoreSnapshot;

/// Default key the snapshot is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "pwdb.v1";

/// Key holding the list screen's search history.
pub const SEARCH_HISTORY_KEY: &str = "search.history";

/// Callback receiving persistence faults.
pub type FaultObserver = Arc<dyn Fn(&PersistenceFault) + Send + Sync>;

/// Observer that ignores every fault. Faults are still logged.
pub fn ignore_faults() -> FaultObserver {
    Arc::new(|_| {})
}

/// What `load` found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A persisted snapshot was decoded and is now in memory.
    Restored,
    /// Nothing was stored under the key; defaults are in memory.
    Empty,
    /// The stored blob was unreadable; defaults are in memory.
    Recovered(PersistenceFault),
}

/// Encodes a snapshot into the persisted blob format.
pub fn encode_snapshot(snapshot: &StoreSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Decodes a persisted blob.
///
/// Beyond JSON well-formedness, a blob whose records share an `id` is rejected.
/// Repeated label names, in the label set or on a record, collapse to their
/// first occurrence.
pub fn decode_snapshot(raw: &str) -> Result<StoreSnapshot, String> {
    let mut snapshot: StoreSnapshot = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let mut seen = HashSet::with_capacity(snapshot.records.len());
    for record in &snapshot.records {
        if !seen.insert(record.id.as_str()) {
            return Err(format!("duplicate record id '{}'", record.id));
        }
    }

    snapshot.labels = dedup_labels(std::mem::take(&mut snapshot.labels));
    for record in &mut snapshot.records {
        record.labels = dedup_labels(std::mem::take(&mut record.labels));
    }
    Ok(snapshot)
}

/// Reads and decodes the snapshot stored under `key`.
///
/// Never fails: an absent key yields defaults with [`LoadOutcome::Empty`], an
/// unreadable or malformed blob yields defaults with [`LoadOutcome::Recovered`].
pub fn load_snapshot(
    kv: &dyn KeyValueStore,
    key: &str,
    observer: &FaultObserver,
) -> (StoreSnapshot, LoadOutcome) {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!(key, "no persisted snapshot, starting empty");
            return (StoreSnapshot::default(), LoadOutcome::Empty);
        }
        Err(e) => return recovered(PersistenceFault::LoadFailed(e.to_string()), observer),
    };

    match decode_snapshot(&raw) {
        Ok(snapshot) => {
            info!(key, records = snapshot.records.len(), "snapshot loaded");
            (snapshot, LoadOutcome::Restored)
        }
        Err(e) => recovered(PersistenceFault::LoadFailed(e), observer),
    }
}

fn recovered(fault: PersistenceFault, observer: &FaultObserver) -> (StoreSnapshot, LoadOutcome) {
    warn!("{}; falling back to defaults", fault);
    observer(&fault);
    (StoreSnapshot::default(), LoadOutcome::Recovered(fault))
}

enum Command {
    Persist(Arc<StoreSnapshot>),
    Remove(String),
    Flush(Sender<()>),
}

/// Serialized, coalescing writer for store snapshots.
///
/// Falls back to writing on the caller's thread if the worker thread cannot
/// be spawned.
pub struct PersistQueue {
    target: Arc<WriteTarget>,
    sender: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

struct WriteTarget {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    observer: FaultObserver,
}

impl WriteTarget {
    fn write(&self, snapshot: &StoreSnapshot) {
        let blob = match encode_snapshot(snapshot) {
            Ok(blob) => blob,
            Err(e) => return self.fault(PersistenceFault::SerializeFailed(e.to_string())),
        };
        match self.kv.set(&self.key, &blob) {
            Ok(()) => debug!(key = %self.key, bytes = blob.len(), "snapshot persisted"),
            Err(e) => self.fault(PersistenceFault::WriteFailed(e.to_string())),
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.kv.remove(key) {
            self.fault(PersistenceFault::RemoveFailed(e.to_string()));
        }
    }

    fn fault(&self, fault: PersistenceFault) {
        warn!(key = %self.key, "{}", fault);
        (self.observer)(&fault);
    }
}

impl PersistQueue {
    /// Starts the worker thread writing to `kv` under `key`.
    pub fn spawn(kv: Arc<dyn KeyValueStore>, key: &str, observer: FaultObserver) -> Self {
        let target = Arc::new(WriteTarget { kv, key: key.to_string(), observer });
        let (sender, receiver) = mpsc::channel();
        let worker_target = target.clone();

        let spawned = thread::Builder::new()
            .name("redblue-persist".to_string())
            .spawn(move || run_worker(receiver, worker_target));

        match spawned {
            Ok(handle) => Self { target, sender: Some(sender), worker: Some(handle) },
            Err(e) => {
                warn!("persist worker unavailable, writing inline: {}", e);
                Self { target, sender: None, worker: None }
            }
        }
    }

    /// Schedules a write of `snapshot`. Returns immediately.
    pub fn persist(&self, snapshot: Arc<StoreSnapshot>) {
        if let Some(Command::Persist(snapshot)) = self.send(Command::Persist(snapshot)) {
            self.target.write(&snapshot);
        }
    }

    /// Schedules removal of an auxiliary key.
    pub fn remove(&self, key: &str) {
        if let Some(Command::Remove(key)) = self.send(Command::Remove(key.to_string())) {
            self.target.remove(&key);
        }
    }

    /// Blocks until every write scheduled so far has completed.
    pub fn flush(&self) {
        let (ack, done) = mpsc::channel();
        if self.send(Command::Flush(ack)).is_none() {
            let _ = done.recv();
        }
    }

    /// Sends a command to the worker. Hands the command back when there is
    /// no worker to take it, so the caller can run it inline.
    fn send(&self, command: Command) -> Option<Command> {
        match &self.sender {
            Some(sender) => sender.send(command).err().map(|e| e.0),
            None => Some(command),
        }
    }
}

impl Drop for PersistQueue {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(receiver: Receiver<Command>, target: Arc<WriteTarget>) {
    while let Ok(first) = receiver.recv() {
        let mut latest: Option<Arc<StoreSnapshot>> = None;
        let mut removals: Vec<String> = Vec::new();
        let mut acks: Vec<Sender<()>> = Vec::new();

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                Command::Persist(snapshot) => latest = Some(snapshot),
                Command::Remove(key) => removals.push(key),
                Command::Flush(ack) => acks.push(ack),
            }
            next = receiver.try_recv().ok();
        }

        if let Some(snapshot) = latest {
            target.write(&snapshot);
        }
        for key in removals {
            target.remove(&key);
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
}

use std::fmt;

// === StoreError ===

/// Errors returned by credential store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A required field was empty. Carries the field name.
    Validation(String),
    /// No record with the given ID exists.
    NotFound(String),
    /// A backup blob could not be parsed as a snapshot.
    InvalidBackup(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(field) => write!(f, "Required field is empty: {}", field),
            StoreError::NotFound(id) => write!(f, "Credential not found: {}", id),
            StoreError::InvalidBackup(msg) => write!(f, "Invalid backup: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// === KvError ===

/// Errors from a key-value persistence backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// The underlying database failed.
    DatabaseError(String),
    /// The write was rejected by the backend.
    WriteFailed(String),
}

impl fmt::Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvError::DatabaseError(msg) => write!(f, "Key-value database error: {}", msg),
            KvError::WriteFailed(msg) => write!(f, "Key-value write failed: {}", msg),
        }
    }
}

impl std::error::Error for KvError {}

// === PersistenceFault ===

/// A persistence problem that was recovered from but should not go unnoticed.
///
/// Delivered to the store's fault observer; never returned to the caller of a
/// mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceFault {
    /// The persisted blob could not be read or parsed; defaults were used.
    LoadFailed(String),
    /// A snapshot could not be serialized.
    SerializeFailed(String),
    /// A snapshot could not be written to the backend.
    WriteFailed(String),
    /// A key could not be removed from the backend.
    RemoveFailed(String),
}

impl fmt::Display for PersistenceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceFault::LoadFailed(msg) => write!(f, "Failed to load snapshot: {}", msg),
            PersistenceFault::SerializeFailed(msg) => {
                write!(f, "Failed to serialize snapshot: {}", msg)
            }
            PersistenceFault::WriteFailed(msg) => write!(f, "Failed to persist snapshot: {}", msg),
            PersistenceFault::RemoveFailed(msg) => write!(f, "Failed to remove key: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceFault {}

// === AuthError ===

/// Errors from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider rejected the request. Carries the provider's message.
    Rejected(String),
    /// The provider could not be reached.
    NetworkError(String),
    /// The provider's response could not be understood.
    InvalidResponse(String),
    /// Email or password was empty.
    MissingCredentials,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected(msg) => write!(f, "{}", msg),
            AuthError::NetworkError(msg) => write!(f, "Auth network error: {}", msg),
            AuthError::InvalidResponse(msg) => write!(f, "Invalid auth response: {}", msg),
            AuthError::MissingCredentials => write!(f, "Email and password are required"),
        }
    }
}

impl std::error::Error for AuthError {}

// === ExportError ===

/// Errors from exporting records or backups to files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// A file system operation failed.
    FileSystemError(String),
    /// Reading the persisted blob failed.
    StorageError(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::FileSystemError(msg) => write!(f, "Export file system error: {}", msg),
            ExportError::StorageError(msg) => write!(f, "Export storage error: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<KvError> for ExportError {
    fn from(e: KvError) -> Self {
        ExportError::StorageError(e.to_string())
    }
}

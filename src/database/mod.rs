//! RedBlue database layer.
//!
//! Provides SQLite connection management, schema migrations and the
//! key-value backends the credential store persists through.
//!
//! # Usage
//!
//! ```no_run
//! use redblue::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("redblue.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! // Access the underlying connection for queries
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod kv_store;
pub mod migrations;

pub use connection::Database;
pub use kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};

//! RedBlue Passwords: local credential store with snapshot persistence.
//!
//! This library crate exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;

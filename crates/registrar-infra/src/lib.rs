//! Infrastructure layer for Registrar.
//!
//! Contains implementations of the port traits defined in `registrar-core`:
//! the SQLite query executor, SHA-256 cache-key hashing, config loading and
//! data directory resolution.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod sqlite;

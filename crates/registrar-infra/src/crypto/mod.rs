//! Cryptographic operations for Registrar.
//!
//! - `hash`: SHA-256 hashing of cache keys

pub mod hash;

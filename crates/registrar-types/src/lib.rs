//! Shared domain types for Registrar.
//!
//! This crate contains the domain types used across the Registrar workspace:
//! intents and slots, query templates and parameters, dialogue sessions,
//! turn results, engine configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod intent;
pub mod query;
pub mod response;
pub mod role;
pub mod session;

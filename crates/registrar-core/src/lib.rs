//! Business logic and port trait definitions for Registrar.
//!
//! This crate holds the conversational query pipeline: intent resolution,
//! slot extraction, the slot-filling dialogue state machine, template
//! binding, the SQL safety gate and the query cache. It defines the "ports"
//! (`QueryExecutor`, `ContentHasher`, `RoleGate`) that the infrastructure
//! layer implements and never depends on `registrar-infra` or any database crate.

pub mod dialogue;
pub mod hash;
pub mod lexicon;
pub mod nlu;
pub mod permission;
pub mod query;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

//! Slot-filling dialogue engine for Registrar.
//!
//! The dialogue module turns one user message into one structured result:
//! - `DialogueManager`: owns the READY/COLLECTING state machine and drives a
//!   turn through resolution, extraction, the role gate and query execution

pub mod manager;

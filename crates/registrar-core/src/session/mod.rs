//! Per-user session storage and conversational context tracking.

pub mod context;
pub mod store;

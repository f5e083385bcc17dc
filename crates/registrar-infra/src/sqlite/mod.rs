//! SQLite storage layer.
//!
//! The records database is opened with WAL mode and split read/write pools.
//! Queries from the dialogue engine only ever run on the read-only pool.

pub mod pool;
pub mod records;

//! QueryExecutor trait definition.
//!
//! The data-access collaborator. The core never opens connections itself;
//! implementations live in registrar-infra (e.g., `SqliteQueryExecutor`).

use registrar_types::error::DataAccessError;
use registrar_types::query::{QueryParam, Record};

/// Executes a vetted, parameterized statement and returns its rows.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait QueryExecutor: Send + Sync {
    fn execute(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> impl std::future::Future<Output = Result<Vec<Record>, DataAccessError>> + Send;
}

//! SQLite implementation of the `QueryExecutor` port.
//!
//! Binds template parameters positionally and maps each result row to a JSON
//! object keyed by column name. Column values are decoded by their runtime
//! SQLite type: INTEGER, REAL, TEXT or NULL.

use registrar_core::query::executor::QueryExecutor;
use registrar_types::error::DataAccessError;
use registrar_types::query::{QueryParam, Record};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row};
use tracing::debug;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `QueryExecutor`.
pub struct SqliteQueryExecutor {
    pool: DatabasePool,
}

impl SqliteQueryExecutor {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn map_sqlx_error(err: sqlx::Error) -> DataAccessError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DataAccessError::Connection
        }
        other => DataAccessError::Query(other.to_string()),
    }
}

fn column_value(row: &SqliteRow, index: usize) -> Result<Value, DataAccessError> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map_or(Value::Null, Value::from));
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return Ok(value
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number));
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return Ok(value.map_or(Value::Null, Value::String));
    }
    let name = row.columns().get(index).map(|c| c.name().to_string());
    Err(DataAccessError::Decode(format!(
        "unsupported value in column {}",
        name.unwrap_or_else(|| index.to_string())
    )))
}

fn row_to_record(row: &SqliteRow) -> Result<Record, DataAccessError> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), column_value(row, index)?);
    }
    Ok(record)
}

// ---------------------------------------------------------------------------
// QueryExecutor implementation
// ---------------------------------------------------------------------------

impl QueryExecutor for SqliteQueryExecutor {
    async fn execute(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Record>, DataAccessError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                QueryParam::Integer(n) => query.bind(*n),
                QueryParam::Text(s) => query.bind(s.clone()),
            };
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;
        debug!(rows = rows.len(), params = params.len(), "SQLite query returned");

        rows.iter().map(row_to_record).collect()
    }
}

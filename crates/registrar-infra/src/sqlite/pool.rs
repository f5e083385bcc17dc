//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. The writer pool holds a single
//! connection and is used for migrations; the multi-connection reader pool is
//! opened read-only, so nothing the query engine runs can modify records.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: read-only, up to 8 connections, serves every template query.
/// - `writer`: single connection, runs migrations.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the records database, creating it and running migrations if needed.
    ///
    /// Both pools use WAL journal mode, foreign key enforcement and a 5-second
    /// busy timeout.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Run migrations on writer before opening reader pool
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        info!(database_url, "Records database ready");
        Ok(Self { reader, writer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_pool(dir: &tempfile::TempDir, name: &str) -> DatabasePool {
        let url = format!("sqlite://{}?mode=rwc", dir.path().join(name).display());
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let pool = temp_pool(&dir, "test.db").await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        for table in [
            "alumnos",
            "calificaciones",
            "horarios",
            "inscripciones",
            "materias",
            "profesores",
        ] {
            assert!(table_names.contains(&table), "{table} table missing");
        }
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let pool = temp_pool(&dir, "test_wal.db").await;

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_reader_pool_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let pool = temp_pool(&dir, "test_ro.db").await;

        let result = sqlx::query("DELETE FROM alumnos")
            .execute(&pool.reader)
            .await;
        assert!(result.is_err());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM alumnos")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_reopening_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let pool = temp_pool(&dir, "existing.db").await;
        sqlx::query("INSERT INTO alumnos (id, matricula, nombre) VALUES (1, 'Z999', 'Real Student')")
            .execute(&pool.writer)
            .await
            .unwrap();
        pool.writer.close().await;
        pool.reader.close().await;

        let reopened = temp_pool(&dir, "existing.db").await;
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, nombre FROM alumnos")
            .fetch_all(&reopened.reader)
            .await
            .unwrap();
        assert_eq!(rows, vec![(1, "Real Student".to_string())]);
    }
}

//! Query execution engine: safety gate, cache, data access and statistics.
//!
//! `QueryEngine::run` is the only path from a bound template to the
//! data-access collaborator. A statement that fails the safety gate is
//! logged for audit and never executed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use registrar_types::error::DataAccessError;
use registrar_types::query::{ExecutionStats, QueryOutcome, QueryParam, QueryTemplate};
use tracing::{debug, error, warn};

use crate::hash::ContentHasher;
use crate::query::cache::QueryCache;
use crate::query::executor::QueryExecutor;
use crate::query::safety::{self, Rejection};

/// Why a query did not produce rows.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("query '{template_id}' rejected: {reason}")]
    Unsafe {
        template_id: String,
        reason: Rejection,
    },

    #[error("query '{template_id}' failed: {source}")]
    Execution {
        template_id: String,
        #[source]
        source: DataAccessError,
    },
}

/// Runs vetted templates through the cache and the data-access collaborator.
pub struct QueryEngine<E: QueryExecutor, H: ContentHasher> {
    executor: E,
    cache: QueryCache<H>,
    stats: Mutex<ExecutionStats>,
}

impl<E: QueryExecutor, H: ContentHasher> QueryEngine<E, H> {
    pub fn new(executor: E, hasher: H, ttl: Duration, max_entries: usize) -> Self {
        Self {
            executor,
            cache: QueryCache::new(hasher, ttl, max_entries),
            stats: Mutex::new(ExecutionStats::default()),
        }
    }

    pub fn cache(&self) -> &QueryCache<H> {
        &self.cache
    }

    /// Copy of the current execution statistics.
    pub fn stats(&self) -> ExecutionStats {
        match self.stats.lock() {
            Ok(stats) => stats.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update_stats(&self, f: impl FnOnce(&mut ExecutionStats)) {
        match self.stats.lock() {
            Ok(mut stats) => f(&mut stats),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Gate, then serve from cache or execute and cache.
    pub async fn run(
        &self,
        template: &QueryTemplate,
        params: &[QueryParam],
    ) -> Result<QueryOutcome, QueryError> {
        if let Some(reason) = safety::check(&template.body) {
            warn!(
                template_id = %template.id,
                reason = %reason,
                query = %template.body,
                "Rejected unsafe query"
            );
            return Err(QueryError::Unsafe {
                template_id: template.id.clone(),
                reason,
            });
        }

        let key = self.cache.key(&template.body, params);
        if let Some(rows) = self.cache.get(&key) {
            self.update_stats(|s| s.record_hit());
            debug!(template_id = %template.id, rows = rows.len(), "Cache hit");
            return Ok(QueryOutcome {
                rows,
                cached: true,
                latency_ms: 0,
            });
        }

        let started = Instant::now();
        let result = self.executor.execute(&template.body, params).await;
        let elapsed = started.elapsed();

        match result {
            Ok(rows) => {
                self.update_stats(|s| s.record_execution(elapsed.as_secs_f64() * 1000.0));
                self.cache.insert(key, &rows);
                debug!(
                    template_id = %template.id,
                    rows = rows.len(),
                    latency_ms = elapsed.as_millis() as u64,
                    "Query executed"
                );
                Ok(QueryOutcome {
                    rows,
                    cached: false,
                    latency_ms: elapsed.as_millis() as u64,
                })
            }
            Err(source) => {
                self.update_stats(|s| s.record_error());
                error!(template_id = %template.id, error = %source, "Query execution failed");
                Err(QueryError::Execution {
                    template_id: template.id.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
    use crate::testing::{FakeExecutor, PlainHasher, record};

    fn engine(executor: FakeExecutor) -> QueryEngine<FakeExecutor, PlainHasher> {
        QueryEngine::new(executor, PlainHasher, DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }

    fn template() -> QueryTemplate {
        QueryTemplate::new(
            "promedio_alumno",
            "SELECT nombre FROM alumnos WHERE nombre LIKE ?",
            &["nombre_alumno"],
        )
    }

    #[tokio::test]
    async fn test_second_identical_query_is_served_from_cache() {
        let executor = FakeExecutor::returning(vec![record(&[("nombre", "Juan Perez")])]);
        let engine = engine(executor.clone());
        let params = vec![QueryParam::Text("%Juan%".to_string())];

        let first = engine.run(&template(), &params).await.unwrap();
        let second = engine.run(&template(), &params).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.latency_ms, 0);
        assert_eq!(first.rows, second.rows);
        assert_eq!(executor.calls().len(), 1);

        let stats = engine.stats();
        assert_eq!(stats.total_queries, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.errors, 0);
    }

    #[tokio::test]
    async fn test_different_params_miss_the_cache() {
        let executor = FakeExecutor::returning(Vec::new());
        let engine = engine(executor.clone());

        engine
            .run(&template(), &[QueryParam::Text("%Ana%".to_string())])
            .await
            .unwrap();
        let other = engine
            .run(&template(), &[QueryParam::Text("%Luis%".to_string())])
            .await
            .unwrap();

        assert!(!other.cached);
        assert_eq!(executor.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unsafe_template_never_reaches_executor() {
        let executor = FakeExecutor::returning(Vec::new());
        let engine = engine(executor.clone());
        let bad = QueryTemplate::new("bad", "SELECT * FROM x; DROP TABLE x", &[]);

        let err = engine.run(&bad, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::Unsafe {
                reason: Rejection::ForbiddenKeyword("DROP"),
                ..
            }
        ));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_execution_failure_counts_error_and_is_not_cached() {
        let executor = FakeExecutor::failing();
        let engine = engine(executor.clone());
        let params = vec![QueryParam::Text("%Ana%".to_string())];

        assert!(matches!(
            engine.run(&template(), &params).await,
            Err(QueryError::Execution { .. })
        ));
        assert!(engine.run(&template(), &params).await.is_err());

        assert_eq!(executor.calls().len(), 2);
        assert!(engine.cache().is_empty());
        let stats = engine.stats();
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.total_queries, 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_executed_again() {
        let executor = FakeExecutor::returning(Vec::new());
        let engine = QueryEngine::new(executor.clone(), PlainHasher, Duration::ZERO, 10);
        let params = vec![QueryParam::Integer(2023)];

        engine.run(&template(), &params).await.unwrap();
        let second = engine.run(&template(), &params).await.unwrap();

        assert!(!second.cached);
        assert_eq!(executor.calls().len(), 2);
    }
}

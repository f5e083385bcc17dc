//! Query templates, bound parameters, result rows and execution statistics.

use serde::{Deserialize, Serialize};

use std::fmt;

/// A single result row, keyed by column name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A parameterized query bound to an intent.
///
/// `arity` is derived from the body (one per `?` placeholder) so it can never
/// drift from the SQL text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTemplate {
    pub id: String,
    pub body: String,
    /// Slot fields bound to the placeholders, in placeholder order.
    pub slots: Vec<String>,
    pub arity: usize,
}

impl QueryTemplate {
    pub fn new(id: impl Into<String>, body: impl Into<String>, slots: &[&str]) -> Self {
        let body = body.into();
        let arity = body.matches('?').count();
        Self {
            id: id.into(),
            body,
            slots: slots.iter().map(|s| s.to_string()).collect(),
            arity,
        }
    }
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    Integer(i64),
    Text(String),
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParam::Integer(n) => write!(f, "{n}"),
            QueryParam::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Rows plus how they were obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub rows: Vec<Record>,
    pub cached: bool,
    pub latency_ms: u64,
}

/// Metadata handed to the renderer alongside the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMeta {
    pub template_id: String,
    pub params: Vec<QueryParam>,
    pub row_count: usize,
    pub cached: bool,
    pub latency_ms: u64,
}

/// Aggregate execution health, shared by every user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Queries that reached the data-access collaborator.
    pub total_queries: u64,
    /// Rolling average latency of those queries, in milliseconds.
    pub avg_latency_ms: f64,
    pub cache_hits: u64,
    pub errors: u64,
}

impl ExecutionStats {
    /// Count one execution and fold its latency into the running average.
    pub fn record_execution(&mut self, elapsed_ms: f64) {
        self.total_queries += 1;
        let n = self.total_queries as f64;
        self.avg_latency_ms = (self.avg_latency_ms * (n - 1.0) + elapsed_ms) / n;
    }

    pub fn record_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Share of lookups served from cache, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.total_queries + self.cache_hits;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

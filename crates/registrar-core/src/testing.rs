//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use registrar_types::error::DataAccessError;
use registrar_types::query::{QueryParam, Record};

use crate::hash::ContentHasher;
use crate::query::executor::QueryExecutor;

/// Uses the content itself as the key.
pub struct PlainHasher;

impl ContentHasher for PlainHasher {
    fn compute_hash(&self, content: &str) -> String {
        content.to_string()
    }
}

pub fn record(fields: &[(&str, &str)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}

/// A statement the fake executor received.
pub type Call = (String, Vec<QueryParam>);

/// In-memory executor that records every call and returns canned rows.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    rows: Vec<Record>,
    fail: bool,
    calls: Arc<Mutex<Vec<Call>>>,
    release: Option<Arc<Notify>>,
}

impl FakeExecutor {
    pub fn returning(rows: Vec<Record>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Records each call, then waits for `release` before answering.
    pub fn held(rows: Vec<Record>, release: Arc<Notify>) -> Self {
        Self {
            rows,
            release: Some(release),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl QueryExecutor for FakeExecutor {
    async fn execute(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Record>, DataAccessError> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        if let Some(release) = &self.release {
            release.notified().await;
        }
        if self.fail {
            Err(DataAccessError::Query("no such table: alumnos".to_string()))
        } else {
            Ok(self.rows.clone())
        }
    }
}

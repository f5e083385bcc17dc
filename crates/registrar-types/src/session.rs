//! Dialogue session types.
//!
//! A `Session` is the per-user conversational state: which dialogue state it
//! is in, what has been collected so far, and a bounded view of recent
//! history used for recency boosts, sentiment and engagement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::query::QueryParam;

/// Slot values gathered so far, keyed by field id.
pub type SlotValues = BTreeMap<String, String>;

/// A collection in progress: the intent being served and the slots still owed.
///
/// The queue is split into `head` and `rest` so a pending collection can never
/// be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCollection {
    pub intent: String,
    pub template_id: String,
    head: String,
    rest: VecDeque<String>,
    pub collected: SlotValues,
}

/// Result of filling the head of a pending collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionStep {
    /// More slots are owed; the new head is `pending.head()`.
    Continue(PendingCollection),
    /// Every slot is filled.
    Complete {
        intent: String,
        template_id: String,
        collected: SlotValues,
    },
}

impl PendingCollection {
    /// Start a collection. Returns `None` when nothing is missing.
    pub fn new(
        intent: impl Into<String>,
        template_id: impl Into<String>,
        missing: Vec<String>,
        collected: SlotValues,
    ) -> Option<Self> {
        let mut rest: VecDeque<String> = missing.into();
        let head = rest.pop_front()?;
        Some(Self {
            intent: intent.into(),
            template_id: template_id.into(),
            head,
            rest,
            collected,
        })
    }

    /// Field currently being asked for.
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Number of slots still owed, including the head.
    pub fn remaining(&self) -> usize {
        1 + self.rest.len()
    }

    /// Store `value` for the head field and pop it.
    pub fn fill_head(mut self, value: String) -> CollectionStep {
        self.collected.insert(self.head, value);
        match self.rest.pop_front() {
            Some(next) => {
                self.head = next;
                CollectionStep::Continue(self)
            }
            None => CollectionStep::Complete {
                intent: self.intent,
                template_id: self.template_id,
                collected: self.collected,
            },
        }
    }
}

/// Dialogue state. Exactly one per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Ready,
    Collecting(PendingCollection),
}

impl DialogueState {
    pub fn is_collecting(&self) -> bool {
        matches!(self, DialogueState::Collecting(_))
    }
}

/// Coarse sentiment of a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Categorical summary of how engaged the user is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    #[default]
    Initial,
    Exploratory,
    ModeratelyEngaged,
    ActivelyEngaged,
    HighlyEngaged,
}

impl EngagementLevel {
    /// Map an additive engagement score to its band.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 8 => EngagementLevel::HighlyEngaged,
            s if s >= 6 => EngagementLevel::ActivelyEngaged,
            s if s >= 4 => EngagementLevel::ModeratelyEngaged,
            s if s >= 2 => EngagementLevel::Exploratory,
            _ => EngagementLevel::Initial,
        }
    }
}

impl fmt::Display for EngagementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EngagementLevel::Initial => "initial",
            EngagementLevel::Exploratory => "exploratory",
            EngagementLevel::ModeratelyEngaged => "moderately_engaged",
            EngagementLevel::ActivelyEngaged => "actively_engaged",
            EngagementLevel::HighlyEngaged => "highly_engaged",
        };
        write!(f, "{label}")
    }
}

/// One completed turn in a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub message: String,
    pub intent: String,
    pub topic: String,
    pub sentiment: Sentiment,
    pub at: DateTime<Utc>,
}

/// The last query a session ran, kept so a follow-up can re-run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastQuery {
    pub intent: String,
    pub template_id: String,
    pub params: Vec<QueryParam>,
}

/// Per-user conversational state. Volatile: lives for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub state: DialogueState,
    pub history: VecDeque<HistoryEntry>,
    pub last_intent: Option<String>,
    pub sentiment_history: VecDeque<Sentiment>,
    pub engagement: EngagementLevel,
    pub last_query: Option<LastQuery>,
    pub created_at: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            state: DialogueState::Ready,
            history: VecDeque::new(),
            last_intent: None,
            sentiment_history: VecDeque::new(),
            engagement: EngagementLevel::Initial,
            last_query: None,
            created_at: Utc::now(),
            last_activity: None,
        }
    }

    /// Intents of the last `n` turns, most recent first.
    pub fn recent_intents(&self, n: usize) -> impl Iterator<Item = &str> {
        self.history.iter().rev().take(n).map(|h| h.intent.as_str())
    }
}

/// Read-only view of a session for callers outside the dialogue engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub user_id: String,
    pub collecting: bool,
    pub pending_field: Option<String>,
    pub last_intent: Option<String>,
    pub last_sentiment: Option<Sentiment>,
    pub engagement: EngagementLevel,
    pub history_len: usize,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        let pending_field = match &session.state {
            DialogueState::Collecting(pending) => Some(pending.head().to_string()),
            DialogueState::Ready => None,
        };
        Self {
            id: session.id,
            user_id: session.user_id.clone(),
            collecting: session.state.is_collecting(),
            pending_field,
            last_intent: session.last_intent.clone(),
            last_sentiment: session.sentiment_history.back().copied(),
            engagement: session.engagement,
            history_len: session.history.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_collection_requires_missing_fields() {
        assert!(PendingCollection::new("i", "t", Vec::new(), SlotValues::new()).is_none());
    }

    #[test]
    fn test_fill_head_shrinks_queue_until_complete() {
        let pending = PendingCollection::new(
            "horario_dia",
            "horario_dia",
            vec!["dia_semana".to_string(), "grupo".to_string()],
            SlotValues::new(),
        )
        .unwrap();
        assert_eq!(pending.head(), "dia_semana");
        assert_eq!(pending.remaining(), 2);

        let pending = match pending.fill_head("lunes".to_string()) {
            CollectionStep::Continue(p) => p,
            other => panic!("expected Continue, got {other:?}"),
        };
        assert_eq!(pending.head(), "grupo");
        assert_eq!(pending.remaining(), 1);

        match pending.fill_head("3B".to_string()) {
            CollectionStep::Complete { collected, .. } => {
                assert_eq!(collected.get("dia_semana").unwrap(), "lunes");
                assert_eq!(collected.get("grupo").unwrap(), "3B");
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn test_engagement_bands() {
        assert_eq!(EngagementLevel::from_score(9), EngagementLevel::HighlyEngaged);
        assert_eq!(EngagementLevel::from_score(8), EngagementLevel::HighlyEngaged);
        assert_eq!(EngagementLevel::from_score(7), EngagementLevel::ActivelyEngaged);
        assert_eq!(EngagementLevel::from_score(4), EngagementLevel::ModeratelyEngaged);
        assert_eq!(EngagementLevel::from_score(2), EngagementLevel::Exploratory);
        assert_eq!(EngagementLevel::from_score(1), EngagementLevel::Initial);
        assert_eq!(EngagementLevel::HighlyEngaged.to_string(), "highly_engaged");
    }

    #[test]
    fn test_dialogue_state_serde_tag() {
        let json = serde_json::to_string(&DialogueState::Ready).unwrap();
        assert_eq!(json, "{\"state\":\"ready\"}");
    }

    #[test]
    fn test_snapshot_reports_pending_field() {
        let mut session = Session::new("u1");
        session.state = DialogueState::Collecting(
            PendingCollection::new(
                "promedio_alumno",
                "promedio_alumno",
                vec!["nombre_alumno".to_string()],
                SlotValues::new(),
            )
            .unwrap(),
        );
        let snapshot = SessionSnapshot::from(&session);
        assert!(snapshot.collecting);
        assert_eq!(snapshot.pending_field.as_deref(), Some("nombre_alumno"));
        assert_eq!(snapshot.history_len, 0);
    }
}

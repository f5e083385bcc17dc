//! Conversational context: sentiment classification and engagement scoring.
//!
//! `SessionTracker::record_turn` runs once per completed turn. It appends the
//! message to the bounded history, samples its sentiment and recomputes the
//! engagement level from four additive signals:
//!
//! | signal | points |
//! |---|---|
//! | messages in history | >=15: 4, >=10: 3, >=5: 2, >=1: 1 |
//! | distinct topics | >=5: 3, >=3: 2, >=1: 1 |
//! | previous activity within 5 minutes | 1 |
//! | positive majority of the last 3 samples | 1 |

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use registrar_types::config::EngineConfig;
use registrar_types::intent::{CONFIRMATION_INTENT, DEEPEN_PREFIX, NEGATION_INTENT};
use registrar_types::session::{EngagementLevel, HistoryEntry, Sentiment, Session};
use tracing::debug;

use crate::lexicon::{Lexicon, SentimentLexicon};

const POSITIVE_WEIGHT: f64 = 1.2;
const NEGATIVE_WEIGHT: f64 = 1.5;
const NEUTRAL_WEIGHT: f64 = 0.8;

const RECENT_ACTIVITY_WINDOW_MINUTES: i64 = 5;
const SENTIMENT_WINDOW: usize = 3;

/// Classify a message by weighted whole-word keyword hits.
///
/// The strictly highest weighted bucket wins; ties and messages without any
/// hit are neutral.
pub fn classify_sentiment(message: &str, lexicon: &SentimentLexicon) -> Sentiment {
    let padded = format!(
        " {} ",
        message
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
    );
    let hits = |words: &[String]| {
        words
            .iter()
            .filter(|w| padded.contains(&format!(" {w} ")))
            .count() as f64
    };

    let positive = hits(&lexicon.positive) * POSITIVE_WEIGHT;
    let negative = hits(&lexicon.negative) * NEGATIVE_WEIGHT;
    let neutral = hits(&lexicon.neutral) * NEUTRAL_WEIGHT;

    if positive > negative && positive > neutral {
        Sentiment::Positive
    } else if negative > positive && negative > neutral {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Additive engagement score.
pub fn engagement_score(
    depth: usize,
    topics: usize,
    recent_activity: bool,
    positive_majority: bool,
) -> u32 {
    let depth_points = match depth {
        d if d >= 15 => 4,
        d if d >= 10 => 3,
        d if d >= 5 => 2,
        d if d >= 1 => 1,
        _ => 0,
    };
    let topic_points = match topics {
        t if t >= 5 => 3,
        t if t >= 3 => 2,
        t if t >= 1 => 1,
        _ => 0,
    };
    depth_points + topic_points + u32::from(recent_activity) + u32::from(positive_majority)
}

/// Whether positive samples are a strict majority of the last three.
fn positive_majority(samples: impl DoubleEndedIterator<Item = Sentiment>) -> bool {
    let window: Vec<Sentiment> = samples.rev().take(SENTIMENT_WINDOW).collect();
    let positives = window.iter().filter(|s| **s == Sentiment::Positive).count();
    !window.is_empty() && positives * 2 > window.len()
}

/// Updates a session's history, sentiment and engagement after each turn.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    sentiment: SentimentLexicon,
    topics: HashMap<String, String>,
    history_limit: usize,
    sentiment_limit: usize,
}

impl SessionTracker {
    pub fn new(lexicon: &Lexicon, config: &EngineConfig) -> Self {
        Self {
            sentiment: lexicon.sentiment.clone(),
            topics: lexicon
                .intents
                .iter()
                .map(|i| (i.id.clone(), i.topic.clone()))
                .collect(),
            history_limit: config.history_limit,
            sentiment_limit: config.sentiment_limit,
        }
    }

    fn topic_of(&self, intent: &str) -> String {
        let base = intent.strip_prefix(DEEPEN_PREFIX).unwrap_or(intent);
        self.topics
            .get(base)
            .cloned()
            .unwrap_or_else(|| "general".to_string())
    }

    /// Record a completed turn for `intent` at time `now`.
    pub fn record_turn(&self, session: &mut Session, message: &str, intent: &str, now: DateTime<Utc>) {
        let sentiment = classify_sentiment(message, &self.sentiment);

        session.history.push_back(HistoryEntry {
            message: message.to_string(),
            intent: intent.to_string(),
            topic: self.topic_of(intent),
            sentiment,
            at: now,
        });
        while session.history.len() > self.history_limit {
            session.history.pop_front();
        }

        session.sentiment_history.push_back(sentiment);
        while session.sentiment_history.len() > self.sentiment_limit {
            session.sentiment_history.pop_front();
        }

        let recent_activity = session
            .last_activity
            .is_some_and(|prev| now - prev <= Duration::minutes(RECENT_ACTIVITY_WINDOW_MINUTES));
        session.last_activity = Some(now);

        let topics: HashSet<&str> = session.history.iter().map(|h| h.topic.as_str()).collect();
        let score = engagement_score(
            session.history.len(),
            topics.len(),
            recent_activity,
            positive_majority(session.sentiment_history.iter().copied()),
        );
        session.engagement = EngagementLevel::from_score(score);

        // Replies to a previous answer keep pointing at it.
        if intent != CONFIRMATION_INTENT && intent != NEGATION_INTENT {
            let base = intent.strip_prefix(DEEPEN_PREFIX).unwrap_or(intent);
            session.last_intent = Some(base.to_string());
        }

        debug!(
            user_id = %session.user_id,
            intent,
            sentiment = %sentiment,
            engagement = %session.engagement,
            score,
            "Turn recorded"
        );
    }
}

//! Keyword-scored intent resolution with contextual follow-up detection.
//!
//! Scoring, per intent allowed for the caller's role, summed over every
//! keyword found as a substring of the lowercased message:
//!
//! - `base = len(keyword) / len(message)`
//! - doubled when the keyword is the whole message
//! - x1.5 when the keyword appears as a whole word
//!
//! The sum is multiplied by the intent weight, then by 1.2 when the intent
//! is among the last three turns. The best score must exceed the confidence
//! floor, otherwise the fallback intent is returned.

use registrar_types::intent::{
    CONFIRMATION_INTENT, DEEPEN_PREFIX, FALLBACK_INTENT, IntentDefinition, NEGATION_INTENT,
    Resolution, ResolutionSource,
};
use registrar_types::role::Role;
use registrar_types::session::Session;

use crate::lexicon::Lexicon;

const EXACT_MATCH_FACTOR: f64 = 2.0;
const WHOLE_WORD_FACTOR: f64 = 1.5;
const RECENCY_FACTOR: f64 = 1.2;
const RECENCY_WINDOW: usize = 3;

/// Default minimum score an intent must exceed.
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.1;

/// Resolves a message to an intent id. Pure: never mutates the session.
#[derive(Debug, Clone)]
pub struct IntentResolver {
    intents: Vec<IntentDefinition>,
    continuation: Vec<String>,
    confirmation: Vec<String>,
    negation: Vec<String>,
    confidence_floor: f64,
}

impl IntentResolver {
    pub fn new(lexicon: &Lexicon, confidence_floor: f64) -> Self {
        Self {
            intents: lexicon.intents.clone(),
            continuation: lexicon.continuation.clone(),
            confirmation: lexicon.confirmation.clone(),
            negation: lexicon.negation.clone(),
            confidence_floor,
        }
    }

    /// Resolve `message` for a caller with `role`, given the session so far.
    pub fn resolve(&self, message: &str, role: Role, session: &Session) -> Resolution {
        let lowered = message.trim().to_lowercase();

        if let Some(resolution) = self.contextual(&lowered, session) {
            return resolution;
        }

        let recent: Vec<&str> = session.recent_intents(RECENCY_WINDOW).collect();
        let mut best: Option<(&IntentDefinition, f64)> = None;
        for intent in self.intents.iter().filter(|i| i.allows(role)) {
            let score = score_intent(&lowered, intent, &recent);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((intent, score));
            }
        }

        match best {
            Some((intent, score)) if score > self.confidence_floor => Resolution {
                intent: intent.id.clone(),
                score,
                source: ResolutionSource::Scored,
            },
            best => Resolution {
                intent: FALLBACK_INTENT.to_string(),
                score: best.map(|(_, s)| s).unwrap_or(0.0),
                source: ResolutionSource::Fallback,
            },
        }
    }

    /// Continuation, confirmation and negation only apply after a previous intent.
    fn contextual(&self, lowered: &str, session: &Session) -> Option<Resolution> {
        let last_intent = session.last_intent.as_deref()?;

        let intent = if self.continuation.iter().any(|p| lowered.contains(p.as_str())) {
            format!("{DEEPEN_PREFIX}{last_intent}")
        } else if self.confirmation.iter().any(|p| is_reply(lowered, p)) {
            CONFIRMATION_INTENT.to_string()
        } else if self.negation.iter().any(|p| is_reply(lowered, p)) {
            NEGATION_INTENT.to_string()
        } else {
            return None;
        };

        Some(Resolution {
            intent,
            score: 1.0,
            source: ResolutionSource::Contextual,
        })
    }
}

/// Score one intent against an already-lowercased message.
pub fn score_intent(lowered: &str, intent: &IntentDefinition, recent: &[&str]) -> f64 {
    let length = lowered.chars().count();
    if length == 0 {
        return 0.0;
    }
    let padded = pad_words(lowered);

    let mut total = 0.0;
    for keyword in &intent.keywords {
        if !lowered.contains(keyword.as_str()) {
            continue;
        }
        let mut base = keyword.chars().count() as f64 / length as f64;
        if keyword == lowered {
            base *= EXACT_MATCH_FACTOR;
        }
        if padded.contains(&format!(" {keyword} ")) {
            base *= WHOLE_WORD_FACTOR;
        }
        total += base;
    }

    let mut score = total * intent.weight;
    if recent.contains(&intent.id.as_str()) {
        score *= RECENCY_FACTOR;
    }
    score
}

/// Space-padded copy of `text` with punctuation turned into spaces.
fn pad_words(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {cleaned} ")
}

/// A reply phrase matches the whole message or leads it as a word.
fn is_reply(lowered: &str, phrase: &str) -> bool {
    let cleaned = pad_words(lowered);
    let cleaned = cleaned.trim();
    cleaned == phrase || cleaned.starts_with(&format!("{phrase} "))
}

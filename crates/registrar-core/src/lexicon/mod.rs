//! Lexicon and pattern store.
//!
//! A `Lexicon` bundles every static table the engine consults: intent
//! definitions with their keywords and slots, query templates, the
//! contextual follow-up lexicons, sentiment buckets and the per-role record
//! families. Swapping rule sets means swapping this value; the engine code
//! never changes.

mod academic;

use std::collections::HashSet;

use registrar_types::error::LexiconError;
use registrar_types::intent::IntentDefinition;
use registrar_types::query::QueryTemplate;
use registrar_types::role::Role;
use serde::{Deserialize, Serialize};

/// Family that every role may access (small talk, follow-ups).
pub const CONVERSATION_FAMILY: &str = "conversacion";

/// Keyword buckets used for sentiment classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentLexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub neutral: Vec<String>,
}

/// All static tables for one rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    pub intents: Vec<IntentDefinition>,
    pub templates: Vec<QueryTemplate>,
    /// Phrases that ask to expand on the previous answer.
    pub continuation: Vec<String>,
    pub confirmation: Vec<String>,
    pub negation: Vec<String>,
    pub sentiment: SentimentLexicon,
    /// Record families each role may query.
    pub role_families: Vec<(Role, Vec<String>)>,
}

impl Lexicon {
    /// The academic-records rule set (Spanish).
    pub fn academic() -> Self {
        academic::lexicon()
    }

    /// Look up an intent definition by id.
    pub fn intent(&self, id: &str) -> Option<&IntentDefinition> {
        self.intents.iter().find(|i| i.id == id)
    }

    /// Topic label of an intent, `"general"` for anything undeclared.
    pub fn topic_of(&self, id: &str) -> &str {
        self.intent(id).map(|i| i.topic.as_str()).unwrap_or("general")
    }

    /// Check cross-table consistency: unique ids and resolvable template references.
    pub fn validate(&self) -> Result<(), LexiconError> {
        let mut intent_ids = HashSet::new();
        for intent in &self.intents {
            if !intent_ids.insert(intent.id.as_str()) {
                return Err(LexiconError::DuplicateIntent(intent.id.clone()));
            }
        }

        let mut template_ids = HashSet::new();
        for template in &self.templates {
            if !template_ids.insert(template.id.as_str()) {
                return Err(LexiconError::DuplicateTemplate(template.id.clone()));
            }
        }

        for intent in &self.intents {
            if let Some(template_id) = &intent.template_id {
                if !template_ids.contains(template_id.as_str()) {
                    return Err(LexiconError::UnknownTemplate {
                        intent: intent.id.clone(),
                        template_id: template_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

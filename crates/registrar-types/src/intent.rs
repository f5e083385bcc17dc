//! Intent and slot definitions.
//!
//! An intent is a recognizable user goal. Intents that query records declare
//! the slots (query parameters) their template needs; conversational intents
//! declare none and carry no template.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Intent returned when no candidate clears the confidence floor.
pub const FALLBACK_INTENT: &str = "conversacion_general";

/// Synthetic intent for an affirmative reply.
pub const CONFIRMATION_INTENT: &str = "confirmation";

/// Synthetic intent for a negative reply.
pub const NEGATION_INTENT: &str = "negation";

/// Prefix of the synthetic "tell me more" intent (`deepen_<last_intent>`).
pub const DEEPEN_PREFIX: &str = "deepen_";

/// How an extracted slot value is interpreted before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Free text (names, titles, weekdays).
    Text,
    /// Whole number (years, counts). Falls back to text when unparsable.
    Integer,
}

/// How a slot value is bound into the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotBinding {
    /// Bound verbatim.
    Exact,
    /// Wrapped as `%value%` for a `LIKE` comparison.
    Contains,
    /// Lowercased with Spanish accents removed, to match plain keys such as `miercoles`.
    Folded,
}

/// A parameter an intent's query needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequirement {
    /// Field id, e.g. `nombre_alumno`.
    pub field: String,
    /// Regex whose first capture group is the slot value.
    pub pattern: String,
    /// Prompt shown when the value has to be asked for.
    pub prompt: String,
    pub kind: SlotKind,
    pub binding: SlotBinding,
}

/// A recognizable user goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub id: String,
    /// Lowercase keywords; any substring hit contributes to the score.
    pub keywords: Vec<String>,
    /// Roles allowed to resolve to this intent.
    pub roles: Vec<Role>,
    /// Multiplier applied to the summed keyword score.
    pub weight: f64,
    /// Required slots in declaration order.
    #[serde(default)]
    pub slots: Vec<SlotRequirement>,
    /// Template executed once every slot is filled.
    #[serde(default)]
    pub template_id: Option<String>,
    /// Record family checked by the permission gate.
    pub family: String,
    /// Topic label used for engagement variety.
    pub topic: String,
}

impl IntentDefinition {
    /// Whether `role` may resolve to this intent.
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether this intent queries records (as opposed to small talk).
    pub fn is_query(&self) -> bool {
        self.template_id.is_some()
    }
}

/// Where a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Keyword scoring picked the intent.
    Scored,
    /// Nothing cleared the confidence floor.
    Fallback,
    /// A continuation, confirmation or negation lexicon matched.
    Contextual,
}

/// Output of the intent resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub intent: String,
    pub score: f64,
    pub source: ResolutionSource,
}

impl Resolution {
    /// The intent a `deepen_<intent>` resolution refers to, if any.
    pub fn deepened_intent(&self) -> Option<&str> {
        self.intent.strip_prefix(DEEPEN_PREFIX)
    }
}

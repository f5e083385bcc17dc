//! Structured turn results handed to the external renderer.
//!
//! Every turn ends in exactly one `TurnOutcome` variant. Rendering text from
//! it is the caller's job.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::intent::{CONFIRMATION_INTENT, NEGATION_INTENT};
use crate::query::{QueryMeta, Record};

/// Failures surfaced to the caller. Root causes are logged, never exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TemplateArityMismatch,
    UnsafeQueryRejected,
    ExecutionFailure,
    PermissionDenied,
}

impl ErrorKind {
    /// End-user-safe message for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::TemplateArityMismatch => {
                "Lo siento, no pude construir la consulta con los datos proporcionados."
            }
            ErrorKind::UnsafeQueryRejected => "Lo siento, esa consulta no está permitida.",
            ErrorKind::ExecutionFailure => {
                "Lo siento, ocurrió un problema al consultar la información. Intenta de nuevo más tarde."
            }
            ErrorKind::PermissionDenied => "Lo siento, tu rol no tiene acceso a esa información.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::TemplateArityMismatch => "template_arity_mismatch",
            ErrorKind::UnsafeQueryRejected => "unsafe_query_rejected",
            ErrorKind::ExecutionFailure => "execution_failure",
            ErrorKind::PermissionDenied => "permission_denied",
        };
        write!(f, "{label}")
    }
}

/// Shape of a turn that needs no query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationalKind {
    Greeting,
    Farewell,
    Thanks,
    Confirmation,
    Negation,
    /// Fallback small talk, or a follow-up with nothing to follow up on.
    General,
}

impl ConversationalKind {
    pub fn from_intent(intent: &str) -> Self {
        match intent {
            "saludo" => ConversationalKind::Greeting,
            "despedida" => ConversationalKind::Farewell,
            "agradecimiento" => ConversationalKind::Thanks,
            CONFIRMATION_INTENT => ConversationalKind::Confirmation,
            NEGATION_INTENT => ConversationalKind::Negation,
            _ => ConversationalKind::General,
        }
    }
}

/// What a turn produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// A required slot is missing; ask for `field`.
    NeedsInput { field: String, prompt: String },
    /// The query ran (or was served from cache).
    Rows { rows: Vec<Record>, meta: QueryMeta },
    /// No query was involved.
    Conversational { kind: ConversationalKind },
    /// The turn failed; the session is back in a usable state.
    Failed { error: ErrorKind },
}

/// Result of one call to the dialogue engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub intent: String,
    pub outcome: TurnOutcome,
    pub cached: bool,
    pub latency_ms: u64,
}

impl TurnResult {
    pub fn new(intent: impl Into<String>, outcome: TurnOutcome) -> Self {
        Self {
            intent: intent.into(),
            outcome,
            cached: false,
            latency_ms: 0,
        }
    }

    pub fn needs_more_input(&self) -> bool {
        matches!(self.outcome, TurnOutcome::NeedsInput { .. })
    }

    pub fn prompt(&self) -> Option<&str> {
        match &self.outcome {
            TurnOutcome::NeedsInput { prompt, .. } => Some(prompt),
            _ => None,
        }
    }

    pub fn rows(&self) -> Option<&[Record]> {
        match &self.outcome {
            TurnOutcome::Rows { rows, .. } => Some(rows),
            _ => None,
        }
    }

    pub fn meta(&self) -> Option<&QueryMeta> {
        match &self.outcome {
            TurnOutcome::Rows { meta, .. } => Some(meta),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match &self.outcome {
            TurnOutcome::Failed { error } => Some(*error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_follow_outcome() {
        let result = TurnResult::new(
            "promedio_alumno",
            TurnOutcome::NeedsInput {
                field: "nombre_alumno".to_string(),
                prompt: "¿De qué alumno?".to_string(),
            },
        );
        assert!(result.needs_more_input());
        assert_eq!(result.prompt(), Some("¿De qué alumno?"));
        assert!(result.rows().is_none());
        assert!(result.error().is_none());

        let failed = TurnResult::new(
            "promedio_alumno",
            TurnOutcome::Failed {
                error: ErrorKind::ExecutionFailure,
            },
        );
        assert!(!failed.needs_more_input());
        assert_eq!(failed.error(), Some(ErrorKind::ExecutionFailure));
    }

    #[test]
    fn test_conversational_kind_from_intent() {
        assert_eq!(ConversationalKind::from_intent("saludo"), ConversationalKind::Greeting);
        assert_eq!(
            ConversationalKind::from_intent(CONFIRMATION_INTENT),
            ConversationalKind::Confirmation
        );
        assert_eq!(
            ConversationalKind::from_intent("conversacion_general"),
            ConversationalKind::General
        );
    }

    #[test]
    fn test_outcome_serializes_with_type_tag() {
        let outcome = TurnOutcome::Failed {
            error: ErrorKind::UnsafeQueryRejected,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, "{\"type\":\"failed\",\"error\":\"unsafe_query_rejected\"}");
    }

    #[test]
    fn test_conversational_outcome_round_trips() {
        let result = TurnResult::new(
            "saludo",
            TurnOutcome::Conversational {
                kind: ConversationalKind::Greeting,
            },
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"]["type"], "conversational");
        assert_eq!(json["outcome"]["kind"], "greeting");

        let back: TurnResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_error_kind_serializes_like_display() {
        for kind in [
            ErrorKind::TemplateArityMismatch,
            ErrorKind::UnsafeQueryRejected,
            ErrorKind::ExecutionFailure,
            ErrorKind::PermissionDenied,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.to_string()));
        }
    }

    #[test]
    fn test_user_message_hides_root_cause() {
        let msg = ErrorKind::ExecutionFailure.user_message();
        assert!(msg.starts_with("Lo siento"));
        assert!(!msg.contains("sql"));
    }
}

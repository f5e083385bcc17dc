use thiserror::Error;

/// Errors raised by the data-access collaborator (implemented in registrar-infra).
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("row decode error: {0}")]
    Decode(String),
}

/// Errors detected while assembling a lexicon or template table.
///
/// These only occur at startup, when static tables are compiled.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("invalid extraction pattern for slot '{field}': {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("duplicate intent '{0}'")]
    DuplicateIntent(String),

    #[error("duplicate template '{0}'")]
    DuplicateTemplate(String),

    #[error("intent '{intent}' references unknown template '{template_id}'")]
    UnknownTemplate { intent: String, template_id: String },
}

/// Errors related to configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

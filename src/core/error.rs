//! Configuration loading errors

use crate::core::config::SourceFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Error raised while turning configuration text into a definition.
///
/// Every variant that stems from the document itself names the offending
/// field using a dotted path such as `pipelines[0].steps[1].type`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {format} document: {message}")]
    Parse { format: SourceFormat, message: String },

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unknown {kind} '{value}' in `{field}` (expected one of: {expected})")]
    UnknownKind {
        field: String,
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// The field path this error refers to, when it is about a document field
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field }
            | ConfigError::InvalidValue { field, .. }
            | ConfigError::UnknownKind { field, .. } => Some(field),
            ConfigError::Parse { .. } | ConfigError::UnsupportedFormat(_) | ConfigError::Io { .. } => {
                None
            }
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Load-time configuration failure.
///
/// Every variant that concerns a node of the document carries its JSON path
/// (e.g. `characters.liuli.skills[0].value.dice_range`). Loading stops at
/// the first error and no partially built tables are returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing field `{path}`")]
    MissingField { path: String },

    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown reference at `{path}`: no {table} entry named `{id}`")]
    UnknownReference {
        path: String,
        table: &'static str,
        id: String,
    },

    #[error("invalid value at `{path}`: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Stable short name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::MissingField { .. } => "missing_field",
            ConfigError::TypeMismatch { .. } => "type_mismatch",
            ConfigError::UnknownReference { .. } => "unknown_reference",
            ConfigError::InvalidValue { .. } => "invalid_value",
            ConfigError::Malformed(_) => "malformed",
            ConfigError::Io { .. } => "io",
        }
    }

    /// JSON path of the offending node, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { path }
            | ConfigError::TypeMismatch { path, .. }
            | ConfigError::UnknownReference { path, .. }
            | ConfigError::InvalidValue { path, .. } => Some(path),
            ConfigError::Malformed(_) | ConfigError::Io { .. } => None,
        }
    }

    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

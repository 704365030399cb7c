//! Error types surfaced by the migration core.

use std::path::PathBuf;

/// Failure while turning one module's text into migrated text.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The parser rejected the module, or recovered from an error in it.
    /// Positions are 1-based.
    #[error("{file}:{line}:{column}: syntax error: {message}")]
    Syntax {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to generate source for {file}")]
    Generate {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generated source for {file} is not valid UTF-8")]
    Utf8 {
        file: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl TransformError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// Invalid or unreadable migration configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{field}` must not be empty")]
    EmptyModule { field: &'static str },

    #[error("`{field}` is not a valid identifier: '{value}'")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("`sourceNamespace` and `targetNamespace` must differ (both are '{0}')")]
    SameNamespace(String),
}

//! Error taxonomy for answer-file generation.
//!
//! Three families matter to callers:
//! - [`Error::Config`] - bad settings or bad caller-supplied markup, raised
//!   before any output exists.
//! - [`Error::Defect`] - two passes broke a contract between them. Never
//!   caused by input; never swallowed.
//! - [`Error::NamespaceMismatch`] / [`Error::Schema`] - the finished tree
//!   failed the validation gate.

use std::io;

/// Everything that can abort a generation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing settings value, malformed supplied markup.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal contract violation between pipeline passes.
    #[error("pipeline defect: {0}")]
    Defect(String),

    /// Root namespace differs from the schema's target namespace.
    #[error("namespace mismatch: document root is in '{found}', schema targets '{expected}'")]
    NamespaceMismatch { expected: String, found: String },

    /// Structural violation found by the validation gate.
    #[error("schema violation at {path}: {message}")]
    Schema { path: String, message: String },

    /// Markup that could not be parsed.
    #[error("malformed markup: {0}")]
    Markup(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn defect(message: impl Into<String>) -> Self {
        Error::Defect(message.into())
    }

    pub(crate) fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for the two validation-gate variants.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::NamespaceMismatch { .. } | Error::Schema { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message_names_field() {
        let err = Error::config("computer_name: must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid configuration: computer_name: must not be empty"
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_variants() {
        let mismatch = Error::NamespaceMismatch {
            expected: "urn:a".into(),
            found: "urn:b".into(),
        };
        assert!(mismatch.is_validation());
        assert!(Error::schema("/unattend", "bad").is_validation());
        assert!(!Error::defect("dup").is_validation());
    }
}

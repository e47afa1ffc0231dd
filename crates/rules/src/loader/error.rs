//! Error types for rule loading and compilation.

/// Errors that can occur while loading or compiling a rule document.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Rule validation error (bad severity, duplicate flags, wrong kind).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A rule pattern is not a valid regular expression.
    #[error("Pattern error in '{flag}': {source}")]
    Pattern {
        flag: String,
        #[source]
        source: regex::Error,
    },
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

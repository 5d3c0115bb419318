#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// Two stages produced different values for the same field.
    /// This means the chain was assembled in the wrong order.
    #[error("Conflict while merging record fields at '{path}'")]
    FieldConflict { path: String },

    #[error("File not found: {path}: {source}")]
    FileNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Output error: {0}")]
    OutputError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CompilationError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid style configuration: {0}")]
    StyleConfig(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<serde_yaml::Error> for CompilationError {
    fn from(err: serde_yaml::Error) -> Self {
        CompilationError::StyleConfig(err.to_string())
    }
}

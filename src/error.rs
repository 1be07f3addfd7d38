//! Check-specific error types

/// Errors raised while running the index check
#[derive(Debug)]
pub enum CheckError {
    /// The consolidated schema snapshot could not be found
    SchemaNotFound(String),
    /// A changed migration file could not be read
    FileRead { path: String, error: String },
    /// Configuration could not be loaded
    Config(String),
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckError::SchemaNotFound(path) => {
                write!(
                    f,
                    "Schema snapshot not found: {}\n\
                     The check needs the consolidated schema file to resolve index coverage.\n\
                     Set INDEXGUARD_SCHEMA_PATH or pass --schema if it lives elsewhere.",
                    path
                )
            }
            CheckError::FileRead { path, error } => {
                write!(f, "Failed to read migration file {}: {}", path, error)
            }
            CheckError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CheckError {}

impl From<config::ConfigError> for CheckError {
    fn from(error: config::ConfigError) -> Self {
        CheckError::Config(error.to_string())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported input file: {0}")]
    UnsupportedInput(String),

    /// The external "fetch all identifiers" call failed.
    #[error("Identifier enumeration failed: {0}")]
    Collaborator(String),

    #[error("Identifier enumeration returned {received} of {expected} items")]
    PartialEnumeration { expected: usize, received: usize },

    #[error("Identifier enumeration returned no items")]
    EmptyEnumeration,
}

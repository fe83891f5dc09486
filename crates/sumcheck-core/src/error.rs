use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Path '{0}' not found")]
    PathNotFound(String),

    #[error("Storage unavailable for '{path}': {source}")]
    StorageUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not list folder '{path}': {source}")]
    Listing {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

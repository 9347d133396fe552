/// Shared error type used across all smash crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("persistence: {0}")]
    Persistence(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used at the HTTP boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or API failure talking to the model.
    Upstream,
    /// Duplicate username, bad credentials, missing input.
    Validation,
    /// User store unreachable or write failure.
    Persistence,
    /// Anything unclassified.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Upstream => "upstream",
            ErrorKind::Validation => "validation",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_) | Error::Timeout(_) | Error::Provider { .. } => ErrorKind::Upstream,
            Error::DuplicateUsername(_) | Error::InvalidCredentials | Error::MissingField(_) => {
                ErrorKind::Validation
            }
            Error::Persistence(_) | Error::Io(_) => ErrorKind::Persistence,
            Error::Json(_) | Error::Config(_) | Error::Auth(_) | Error::Other(_) => {
                ErrorKind::Internal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Errors from persistence backends.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from an LLM provider call.
///
/// None of these are retried: every turn is a deliberate, possibly billable call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the credential (HTTP 401).
    #[error("Invalid API key: {message}")]
    Auth { message: String },

    /// Any other non-2xx response.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response did not have the expected shape.
    #[error("{0}")]
    Protocol(String),

    /// DNS, TLS, connect or timeout failure, or a broken body stream.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The caller stopped reading a forwarded stream.
    #[error("caller disconnected before the reply completed")]
    Disconnected,
}

impl ProviderError {
    /// HTTP status reported by the provider, when there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProviderError::Auth { .. } => Some(401),
            ProviderError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Request-level error taxonomy.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("AI service error: {0}")]
    Provider(#[from] ProviderError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("{0}")]
    Config(String),
}

impl ChatError {
    /// Short machine-readable kind, used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Validation(_) => "validation",
            ChatError::Auth(_) => "auth",
            ChatError::Provider(ProviderError::Auth { .. }) => "auth",
            ChatError::Provider(_) => "provider",
            ChatError::Storage(_) => "storage",
            ChatError::Config(_) => "config",
        }
    }
}

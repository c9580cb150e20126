use thiserror::Error;

/// An entity invariant was violated. Carries the first offending field and
/// the reason, mirroring the fail-fast validation in the entity setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Name of the field that failed validation.
    pub field: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors from repository operations (used by trait definitions in botmarket-core).
///
/// Absence of a record is not an error at this layer: point lookups return
/// `Ok(None)`. `Conflict` is reserved for an optimistic-concurrency upsert;
/// nothing raises it in the baseline last-writer-wins protocol.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to chatbot operations.
#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("chatbot not found")]
    NotFound,

    #[error("developer not found")]
    DeveloperNotFound,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors related to user account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Error from an outbound messaging or chatbot-endpoint call.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

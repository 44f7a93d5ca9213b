use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommerceApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Transport failure talking to the commerce API: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The commerce API throttled the request")]
    RateLimited,
    #[error("Resource not found: {0}")]
    NotFound(String),
}

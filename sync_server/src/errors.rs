use thiserror::Error;

/// Startup and shutdown failures. Route handlers never surface this type; the webhook
/// acknowledges unconditionally and the workers absorb their own errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

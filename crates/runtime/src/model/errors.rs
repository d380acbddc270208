use thiserror::Error;

/// Errors from the model provider.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

use thiserror::Error;

/// Core domain errors - no I/O dependencies
#[derive(Error, Debug)]
pub enum KitchenError {
    /// A numeric or structural precondition was violated by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl KitchenError {
    /// Shorthand used throughout the calculator for precondition failures.
    pub fn invalid(message: impl Into<String>) -> Self {
        KitchenError::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, KitchenError::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, KitchenError>;

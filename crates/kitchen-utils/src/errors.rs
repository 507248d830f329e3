use thiserror::Error;

/// Presentation errors for kitchen-utils
#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Core domain error: {0}")]
    Core(#[from] kitchen_core::KitchenError),
}

pub type Result<T> = std::result::Result<T, UtilsError>;

use shared::domain::{ProductField, UnknownField};
use thiserror::Error;

/// Rejections raised before anything is sent to the remote store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("product id is missing")]
    MissingId,
    #[error("no value supplied for {field}")]
    MissingValue { field: ProductField },
    #[error("price must be a non-negative number, got {value}")]
    InvalidPrice { value: f64 },
    #[error("invalid price input: \"{raw}\"")]
    InvalidPriceInput { raw: String },
    #[error("image must start with http, got \"{value}\"")]
    NonHttpImage { value: String },
    #[error("{field} must be an integer, got \"{raw}\"")]
    InvalidInteger { field: ProductField, raw: String },
    #[error(transparent)]
    UnknownField(#[from] UnknownField),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("request failed: {0}")]
    Network(String),
    #[error("server responded with status {status}: {message}")]
    Server { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl SyncError {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Validation(_) => "validation",
            SyncError::Network(_) => "network",
            SyncError::Server { .. } => "server",
            SyncError::Decode(_) => "decode",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            SyncError::Decode(value.to_string())
        } else {
            SyncError::Network(value.to_string())
        }
    }
}

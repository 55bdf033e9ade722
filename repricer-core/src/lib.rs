pub mod supplier;
pub mod retry;

pub use supplier::{SheetReader, OfferProvider, RateProvider, BlacklistProvider, ProductCatalog, ProductJob};
pub use retry::RetryPolicy;

/// Failures reported by collaborators
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Transient read failure on {target}: {message}")]
    Transient { target: String, message: String },
    #[error("Malformed value at {target}: {value}")]
    Malformed { target: String, value: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CoreError {
    pub fn transient(target: impl ToString, message: impl ToString) -> Self {
        CoreError::Transient {
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    /// Only transient reads are worth retrying locally
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Transient { .. })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

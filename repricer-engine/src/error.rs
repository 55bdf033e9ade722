use repricer_catalog::{CellError, ProductError};
use repricer_core::CoreError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    #[error("No supply source produced a positive cost ({checked} sources checked)")]
    NoPositiveCost { checked: usize },
}

/// Failure of a single pricing decision
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("Malformed value at {cell}: {source}")]
    MalformedSource {
        cell: String,
        #[source]
        source: CellError,
    },

    #[error("Invalid product configuration: {0}")]
    Configuration(#[from] ProductError),

    #[error(transparent)]
    Collaborator(#[from] CoreError),
}

impl EngineError {
    /// Whether the batch driver should retry the whole decision
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Aggregation(_) => true,
            EngineError::MalformedSource { .. } => true,
            EngineError::Configuration(_) => false,
            EngineError::Collaborator(e) => {
                matches!(e, CoreError::Transient { .. } | CoreError::Malformed { .. })
            }
        }
    }
}

pub mod error;
pub mod aggregator;
pub mod decision;
pub mod undercut;
pub mod runner;

pub use error::{AggregationError, EngineError};
pub use aggregator::{aggregate, AggregatedCost, CostAggregator, SourceCost};
pub use decision::{PriceInfo, PriceReport, Reference};
pub use undercut::{baseline_offer, DecisionInput, UndercutEngine};
pub use runner::{BatchRunner, BatchSummary, BoxedJitter, Collaborators, Outcome, ProductFailure, ReportSink, Stage};

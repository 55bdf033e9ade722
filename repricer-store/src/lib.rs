pub mod app_config;
pub mod snapshot;
pub mod rate_cache;
pub mod report;

pub use app_config::Config;
pub use snapshot::{SnapshotStore, StoreError};
pub use rate_cache::CachedRate;
pub use report::LogSink;

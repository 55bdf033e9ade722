use repricer_core::RetryPolicy;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub batch: BatchConfig,
    pub sources: SourcesConfig,
    pub currency: CurrencyConfig,
    pub snapshot: SnapshotConfig,
}

/// Retries of a whole pricing decision
#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    pub attempts: u32,
    pub delay_ms: u64,
    /// Fixed seed for reproducible runs; entropy when unset
    #[serde(default)]
    pub jitter_seed: Option<u64>,
}

/// Retries of individual collaborator reads
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    pub attempts: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    #[serde(default = "default_rate_ttl")]
    pub rate_ttl_seconds: u64,
}

fn default_rate_ttl() -> u64 { 600 }

#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

impl BatchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.attempts, Duration::from_millis(self.delay_ms))
    }
}

impl SourcesConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.attempts, Duration::from_millis(self.delay_ms))
    }
}

impl CurrencyConfig {
    pub fn rate_ttl(&self) -> Duration {
        Duration::from_secs(self.rate_ttl_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `REPRICER__BATCH__JITTER_SEED=7`
            .add_source(config::Environment::with_prefix("REPRICER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

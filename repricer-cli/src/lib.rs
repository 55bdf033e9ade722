use anyhow::Context;
use repricer_catalog::RandomJitter;
use repricer_engine::{BatchRunner, BoxedJitter, Collaborators};
use repricer_store::{CachedRate, Config, LogSink, SnapshotStore};
use std::sync::Arc;
use tracing::info;

/// A batch runner wired to the configured collaborators
pub struct App {
    pub runner: BatchRunner,
    pub sink: Arc<LogSink>,
}

pub async fn build(config: &Config) -> anyhow::Result<App> {
    let store = SnapshotStore::load(&config.snapshot.path)
        .await
        .with_context(|| format!("Failed to open snapshot {}", config.snapshot.path.display()))?;
    let store = Arc::new(store);

    let rates = Arc::new(CachedRate::new(store.clone(), config.currency.rate_ttl()));
    let sink = Arc::new(LogSink::new());

    let jitter: BoxedJitter = match config.batch.jitter_seed {
        Some(seed) => {
            info!("Using fixed jitter seed {}", seed);
            Box::new(RandomJitter::seeded(seed))
        }
        None => Box::new(RandomJitter::from_entropy()),
    };

    let collaborators = Collaborators {
        catalog: store.clone(),
        sheets: store.clone(),
        offers: store.clone(),
        blacklists: store,
        rates,
        sink: sink.clone(),
    };
    let runner = BatchRunner::new(collaborators, jitter)
        .with_decision_policy(config.batch.retry_policy())
        .with_source_policy(config.sources.retry_policy());

    Ok(App { runner, sink })
}

use anyhow::Context;
use repricer_store::Config;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repricer=info,repricer_cli=info,repricer_engine=info,repricer_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting repricer with snapshot {}", config.snapshot.path.display());

    let app = repricer_cli::build(&config).await?;
    let summary = app.runner.run().await.context("Pricing batch aborted")?;

    for failure in &summary.failures {
        tracing::warn!("{}", failure);
    }
    let prices: Vec<_> = app
        .sink
        .published()
        .iter()
        .map(|report| serde_json::json!({ "product": report.product_id, "price": report.price.adjusted_price }))
        .collect();
    tracing::info!("Posted prices: {}", serde_json::Value::Array(prices));

    Ok(if summary.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

use async_trait::async_trait;
use repricer_core::{CoreError, CoreResult};
use repricer_engine::{PriceReport, ReportSink};
use std::sync::Mutex;
use tracing::info;

/// Report sink that emits each decision as a JSON log event and keeps the
/// reports of the current process for the end-of-run summary.
#[derive(Default)]
pub struct LogSink {
    published: Mutex<Vec<PriceReport>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<PriceReport> {
        self.published
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl ReportSink for LogSink {
    async fn publish(&self, report: &PriceReport) -> CoreResult<()> {
        let payload = serde_json::to_string(report)
            .map_err(|e| CoreError::Malformed {
                target: report.product_id.clone(),
                value: e.to_string(),
            })?;
        info!(product = %report.product_id, "{}", payload);

        match self.published.lock() {
            Ok(mut reports) => reports.push(report.clone()),
            Err(poisoned) => poisoned.into_inner().push(report.clone()),
        }
        Ok(())
    }
}

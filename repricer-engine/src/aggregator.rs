use repricer_catalog::SupplySource;
use repricer_core::{CoreError, RateProvider, RetryPolicy, SheetReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::error::{AggregationError, EngineError};

/// Per-unit cost offered by one supply source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCost {
    pub cost: f64,
    pub label: String,
}

/// Cheapest usable cost plus the raw per-source list kept for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedCost {
    pub cheapest: SourceCost,
    pub all: Vec<Option<SourceCost>>,
}

/// Pick the cheapest positive cost. Ties go to the earliest source in the list.
pub fn aggregate(all: Vec<Option<SourceCost>>) -> Result<AggregatedCost, AggregationError> {
    let mut cheapest: Option<&SourceCost> = None;
    for cost in all.iter().flatten() {
        if cost.cost > 0.0 && cheapest.map_or(true, |best| cost.cost < best.cost) {
            cheapest = Some(cost);
        }
    }

    match cheapest.cloned() {
        Some(cheapest) => Ok(AggregatedCost { cheapest, all }),
        None => Err(AggregationError::NoPositiveCost { checked: all.len() }),
    }
}

/// Reads the supply sources of a product and converts them to costs
pub struct CostAggregator {
    policy: RetryPolicy,
}

impl CostAggregator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// One entry per configured source, `None` when the source is disabled,
    /// not configured, or still failing after its retries. Malformed values
    /// are errors.
    pub async fn collect(
        &self,
        sources: &[SupplySource],
        sheets: &dyn SheetReader,
        rates: &dyn RateProvider,
    ) -> Result<Vec<Option<SourceCost>>, EngineError> {
        let mut rate: Option<Option<f64>> = None;
        let mut costs = Vec::with_capacity(sources.len());

        for source in sources {
            if !source.enabled {
                costs.push(None);
                continue;
            }

            let value = match self
                .policy
                .run(&source.label, |_| sheets.read(&source.price_cell), CoreError::is_transient)
                .await
            {
                Ok(value) => value,
                Err(e) if e.is_transient() => {
                    warn!("Supply source {} unavailable: {}", source.label, e);
                    costs.push(None);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let raw = value.to_amount().map_err(|e| EngineError::MalformedSource {
                cell: source.price_cell.to_string(),
                source: e,
            })?;
            let Some(raw) = raw else {
                debug!("Supply source {} has no price configured", source.label);
                costs.push(None);
                continue;
            };

            let rate = if source.currency_denominated {
                if rate.is_none() {
                    rate = Some(self.fetch_rate(rates).await);
                }
                rate.flatten()
            } else {
                None
            };

            costs.push(source.cost(raw, rate).map(|cost| SourceCost {
                cost,
                label: source.label.clone(),
            }));
        }

        Ok(costs)
    }

    async fn fetch_rate(&self, rates: &dyn RateProvider) -> Option<f64> {
        match self.policy.run("currency rate", |_| rates.rate(), CoreError::is_transient).await {
            Ok(rate) if rate.is_finite() && rate > 0.0 => Some(rate),
            Ok(rate) => {
                warn!("Ignoring invalid currency rate {}", rate);
                None
            }
            Err(e) => {
                warn!("Currency rate unavailable: {}", e);
                None
            }
        }
    }
}

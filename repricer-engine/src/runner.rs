use async_trait::async_trait;
use repricer_catalog::{CellRef, CellValue, JitterSource, StockInfo, StockReadings, StockType};
use repricer_core::{
    BlacklistProvider, CoreError, CoreResult, OfferProvider, ProductCatalog, ProductJob, RateProvider, RetryPolicy,
    SheetReader,
};
use repricer_offer::Blacklist;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use crate::aggregator::CostAggregator;
use crate::decision::{PriceInfo, PriceReport};
use crate::error::EngineError;
use crate::undercut::{baseline_offer, DecisionInput, UndercutEngine};

/// Outbound destination for priced products
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, report: &PriceReport) -> CoreResult<()>;
}

/// Everything the batch talks to
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn ProductCatalog>,
    pub sheets: Arc<dyn SheetReader>,
    pub offers: Arc<dyn OfferProvider>,
    pub blacklists: Arc<dyn BlacklistProvider>,
    pub rates: Arc<dyn RateProvider>,
    pub sink: Arc<dyn ReportSink>,
}

/// Step of the per-product pipeline, used to tag failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Stock,
    Offers,
    Supply,
    Decide,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Stock => "stock",
            Stage::Offers => "offers",
            Stage::Supply => "supply",
            Stage::Decide => "decide",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Product {product_id} failed at {stage}: {error}")]
pub struct ProductFailure {
    pub product_id: String,
    pub stage: Stage,
    #[source]
    pub error: EngineError,
}

trait AtStage<T> {
    fn at(self, product_id: &str, stage: Stage) -> Result<T, ProductFailure>;
}

impl<T, E: Into<EngineError>> AtStage<T> for Result<T, E> {
    fn at(self, product_id: &str, stage: Stage) -> Result<T, ProductFailure> {
        self.map_err(|e| ProductFailure {
            product_id: product_id.to_string(),
            stage,
            error: e.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Priced,
    /// The engine declined to price this run
    NoDecision,
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub priced: usize,
    pub skipped: usize,
    pub disabled: usize,
    pub failed: usize,
    pub failures: Vec<ProductFailure>,
}

impl BatchSummary {
    fn record(&mut self, result: Result<Outcome, ProductFailure>) {
        match result {
            Ok(Outcome::Priced) => self.priced += 1,
            Ok(Outcome::NoDecision) => self.skipped += 1,
            Ok(Outcome::Disabled) => self.disabled += 1,
            Err(failure) => {
                self.failed += 1;
                self.failures.push(failure);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.priced + self.skipped + self.disabled + self.failed
    }
}

pub type BoxedJitter = Box<dyn JitterSource + Send>;

/// Prices every product in the catalog, one at a time
pub struct BatchRunner {
    collaborators: Collaborators,
    engine: Mutex<UndercutEngine<BoxedJitter>>,
    decision_policy: RetryPolicy,
    source_policy: RetryPolicy,
    aggregator: CostAggregator,
    run_id: Uuid,
}

impl BatchRunner {
    pub fn new(collaborators: Collaborators, jitter: BoxedJitter) -> Self {
        let source_policy = RetryPolicy::default();
        Self {
            collaborators,
            engine: Mutex::new(UndercutEngine::new(jitter)),
            decision_policy: RetryPolicy::default(),
            source_policy,
            aggregator: CostAggregator::new(source_policy),
            run_id: Uuid::new_v4(),
        }
    }

    /// Retry policy for a whole decision
    pub fn with_decision_policy(mut self, policy: RetryPolicy) -> Self {
        self.decision_policy = policy;
        self
    }

    /// Retry policy for individual collaborator reads
    pub fn with_source_policy(mut self, policy: RetryPolicy) -> Self {
        self.source_policy = policy;
        self.aggregator = CostAggregator::new(policy);
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Price every listed product. Per-product failures are logged and
    /// counted; only a failure to list the products aborts the batch.
    pub async fn run(&self) -> Result<BatchSummary, EngineError> {
        let ids = self
            .source_policy
            .run("product list", |_| self.collaborators.catalog.list_products(), CoreError::is_transient)
            .await?;
        info!(run_id = %self.run_id, products = ids.len(), "Starting pricing batch");

        let mut summary = BatchSummary::default();
        for id in &ids {
            let result = self.price_product(id).await;
            if let Err(failure) = &result {
                error!(
                    product = %failure.product_id,
                    stage = %failure.stage,
                    error = %failure.error,
                    "Pricing failed"
                );
            }
            summary.record(result);
        }

        info!(
            run_id = %self.run_id,
            priced = summary.priced,
            skipped = summary.skipped,
            disabled = summary.disabled,
            failed = summary.failed,
            "Pricing batch finished"
        );
        Ok(summary)
    }

    pub async fn price_product(&self, id: &str) -> Result<Outcome, ProductFailure> {
        let job = self
            .source_policy
            .run(id, |_| self.collaborators.catalog.load_product(id), CoreError::is_transient)
            .await
            .at(id, Stage::Load)?;

        if !job.product.enabled {
            info!(product = %id, "Run flag is off, skipping");
            return Ok(Outcome::Disabled);
        }

        let job = &job;
        let decision = self
            .decision_policy
            .run(id, |attempt| self.decide_once(job, attempt), |f: &ProductFailure| f.error.is_retryable())
            .await?;

        let Some(price) = decision else {
            info!(product = %id, "No price decision this run");
            return Ok(Outcome::NoDecision);
        };

        let posted_stock = job.stock.posted_stock(&price.stock);
        let report = PriceReport::new(self.run_id, &job.product.id, posted_stock, price);
        self.collaborators.sink.publish(&report).await.at(id, Stage::Report)?;

        info!(
            product = %id,
            price = report.price.adjusted_price,
            stock_type = %report.price.stock_type,
            reference = %report.price.reference.seller,
            "Priced"
        );
        Ok(Outcome::Priced)
    }

    async fn decide_once(&self, job: &ProductJob, attempt: u32) -> Result<Option<PriceInfo>, ProductFailure> {
        let product = &job.product;
        let id = product.id.as_str();
        debug!(product = %id, attempt, "Deciding price");

        let readings = self.read_stock(&job.stock).await.at(id, Stage::Stock)?;
        let blacklist = self.load_blacklist(job).await;
        let offers = self
            .source_policy
            .run(
                &product.compare_ref,
                |_| self.collaborators.offers.list_offers(&product.compare_ref),
                CoreError::is_transient,
            )
            .await
            .at(id, Stage::Offers)?;

        let (stock_type, _) = job.stock.classify(readings);
        let supply = if stock_type == StockType::StockFake {
            // Supply is read only once a baseline offer exists
            product.validate().at(id, Stage::Decide)?;
            if baseline_offer(product, &offers, &blacklist).is_none() {
                return Ok(None);
            }
            self.aggregator
                .collect(&job.sources, &*self.collaborators.sheets, &*self.collaborators.rates)
                .await
                .at(id, Stage::Supply)?
        } else {
            Vec::new()
        };

        let input = DecisionInput {
            product,
            stock: &job.stock,
            readings,
            offers: &offers,
            supply: &supply,
            blacklist: &blacklist,
        };
        let decision = {
            let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
            engine.decide(&input)
        };
        decision.at(id, Stage::Decide)
    }

    async fn read_stock(&self, stock: &StockInfo) -> Result<StockReadings, EngineError> {
        let cells = [stock.stock_1.clone(), stock.stock_2.clone()];
        let sheets = &*self.collaborators.sheets;

        let values = if stock.shares_sheet() {
            self.source_policy
                .run("stock", |_| sheets.read_many(&cells), CoreError::is_transient)
                .await?
        } else {
            let mut values = Vec::with_capacity(cells.len());
            for cell in &cells {
                let value = self
                    .source_policy
                    .run(&cell.cell, |_| sheets.read(cell), CoreError::is_transient)
                    .await?;
                values.push(value);
            }
            values
        };

        let count = |index: usize, cell: &CellRef| {
            values
                .get(index)
                .unwrap_or(&CellValue::Empty)
                .to_count()
                .map_err(|source| EngineError::MalformedSource {
                    cell: cell.to_string(),
                    source,
                })
        };

        Ok(StockReadings {
            stock_1: count(0, &cells[0])?,
            stock_2: count(1, &cells[1])?,
        })
    }

    async fn load_blacklist(&self, job: &ProductJob) -> Blacklist {
        let blacklists = &*self.collaborators.blacklists;
        let result = self
            .source_policy
            .run("blacklist", |_| blacklists.blacklist(&job.product), CoreError::is_transient)
            .await;
        match result {
            Ok(blacklist) => blacklist,
            Err(e) => {
                warn!(product = %job.product.id, error = %e, "Blacklist unavailable, continuing without it");
                Blacklist::default()
            }
        }
    }
}

use chrono::Utc;
use repricer_catalog::{PriceBounds, StockSnapshot, StockType};
use repricer_offer::UnitOffer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::aggregator::AggregatedCost;

/// Seller whose price the posted price was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub seller: String,
    pub price: f64,
}

/// Outcome of one pricing decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    /// Bounds of the active regime
    pub bounds: PriceBounds,
    pub adjusted_price: f64,
    /// Cheapest valid competitor listing, per unit
    pub baseline: UnitOffer,
    pub stock_type: StockType,
    pub stock: StockSnapshot,
    pub reference: Reference,
    /// First jitter draw of the run
    pub jitter: f64,
    /// Supply costs, only for stock_fake runs
    pub supply: Option<AggregatedCost>,
}

/// What the report sink receives for each priced product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceReport {
    pub run_id: Uuid,
    pub product_id: String,
    pub timestamp: i64,
    /// Quantity to list alongside the price
    pub posted_stock: i64,
    pub price: PriceInfo,
}

impl PriceReport {
    pub fn new(run_id: Uuid, product_id: impl Into<String>, posted_stock: i64, price: PriceInfo) -> Self {
        Self {
            run_id,
            product_id: product_id.into(),
            timestamp: Utc::now().timestamp(),
            posted_stock,
            price,
        }
    }
}

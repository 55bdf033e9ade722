use async_trait::async_trait;
use repricer_catalog::{CellRef, CellValue, Product, StockInfo, SupplySource};
use repricer_offer::{Blacklist, OfferItem};
use serde::{Deserialize, Serialize};
use crate::CoreResult;

/// Everything needed to price one product in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductJob {
    pub product: Product,
    pub stock: StockInfo,
    #[serde(default)]
    pub sources: Vec<SupplySource>,
}

/// Reads single cells from the pricing spreadsheets
#[async_trait]
pub trait SheetReader: Send + Sync {
    async fn read(&self, cell: &CellRef) -> CoreResult<CellValue>;

    /// Batched read; implementations backed by a remote sheet should override
    /// this to issue one request.
    async fn read_many(&self, cells: &[CellRef]) -> CoreResult<Vec<CellValue>> {
        let mut values = Vec::with_capacity(cells.len());
        for cell in cells {
            values.push(self.read(cell).await?);
        }
        Ok(values)
    }
}

/// Scraped competitor listings; order is not guaranteed
#[async_trait]
pub trait OfferProvider: Send + Sync {
    async fn list_offers(&self, compare_ref: &str) -> CoreResult<Vec<OfferItem>>;
}

/// Exchange rate for currency-denominated supply sources
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn rate(&self) -> CoreResult<f64>;
}

#[async_trait]
pub trait BlacklistProvider: Send + Sync {
    async fn blacklist(&self, product: &Product) -> CoreResult<Blacklist>;
}

/// Source of the product rows to price
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn list_products(&self) -> CoreResult<Vec<String>>;

    async fn load_product(&self, id: &str) -> CoreResult<ProductJob>;
}

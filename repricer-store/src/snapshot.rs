//! File-backed collaborators.
//!
//! A snapshot is one JSON document holding everything a batch reads: product
//! rows, sheet cells, scraped offers, blacklists and the currency rate. It
//! stands in for the live spreadsheet and scraper during dry runs and tests.

use async_trait::async_trait;
use repricer_catalog::{CellRef, CellValue, Product};
use repricer_core::{
    BlacklistProvider, CoreError, CoreResult, OfferProvider, ProductCatalog, ProductJob, RateProvider, SheetReader,
};
use repricer_offer::{Blacklist, OfferItem};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate product id {0}")]
    DuplicateProduct(String),
}

#[derive(Debug, Deserialize)]
struct CellEntry {
    #[serde(flatten)]
    cell: CellRef,
    value: CellValue,
}

#[derive(Debug, Deserialize)]
struct BlacklistEntry {
    #[serde(flatten)]
    cell: CellRef,
    sellers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    products: Vec<ProductJob>,
    #[serde(default)]
    cells: Vec<CellEntry>,
    /// Listings keyed by compare reference
    #[serde(default)]
    offers: HashMap<String, Vec<OfferItem>>,
    #[serde(default)]
    blacklists: Vec<BlacklistEntry>,
    #[serde(default)]
    rate: Option<f64>,
}

/// In-memory view of a snapshot file serving every read-side collaborator
pub struct SnapshotStore {
    products: Vec<ProductJob>,
    cells: HashMap<CellRef, CellValue>,
    offers: HashMap<String, Vec<OfferItem>>,
    blacklists: HashMap<CellRef, Vec<String>>,
    rate: Option<f64>,
}

impl SnapshotStore {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json(&raw)?;
        info!(
            "Loaded snapshot {} ({} products, {} cells)",
            path.display(),
            store.products.len(),
            store.cells.len()
        );
        Ok(store)
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let file: SnapshotFile = serde_json::from_str(raw)?;

        let mut seen = std::collections::HashSet::new();
        for job in &file.products {
            if !seen.insert(job.product.id.as_str()) {
                return Err(StoreError::DuplicateProduct(job.product.id.clone()));
            }
        }

        Ok(Self {
            cells: file.cells.into_iter().map(|e| (e.cell, e.value)).collect(),
            blacklists: file.blacklists.into_iter().map(|e| (e.cell, e.sellers)).collect(),
            products: file.products,
            offers: file.offers,
            rate: file.rate,
        })
    }

    fn cell(&self, cell: &CellRef) -> CellValue {
        self.cells.get(cell).cloned().unwrap_or(CellValue::Empty)
    }
}

#[async_trait]
impl SheetReader for SnapshotStore {
    async fn read(&self, cell: &CellRef) -> CoreResult<CellValue> {
        Ok(self.cell(cell))
    }

    async fn read_many(&self, cells: &[CellRef]) -> CoreResult<Vec<CellValue>> {
        Ok(cells.iter().map(|cell| self.cell(cell)).collect())
    }
}

#[async_trait]
impl OfferProvider for SnapshotStore {
    async fn list_offers(&self, compare_ref: &str) -> CoreResult<Vec<OfferItem>> {
        let offers = self.offers.get(compare_ref).cloned().unwrap_or_default();
        debug!("{} offers for {}", offers.len(), compare_ref);
        Ok(offers)
    }
}

#[async_trait]
impl BlacklistProvider for SnapshotStore {
    async fn blacklist(&self, product: &Product) -> CoreResult<Blacklist> {
        let Some(cell) = &product.blacklist_ref else {
            return Ok(Blacklist::default());
        };
        self.blacklists
            .get(cell)
            .map(|sellers| Blacklist::new(sellers.iter().map(String::as_str)))
            .ok_or_else(|| CoreError::NotFound(format!("blacklist at {}", cell)))
    }
}

#[async_trait]
impl RateProvider for SnapshotStore {
    async fn rate(&self) -> CoreResult<f64> {
        self.rate
            .ok_or_else(|| CoreError::NotFound("currency rate".into()))
    }
}

#[async_trait]
impl ProductCatalog for SnapshotStore {
    async fn list_products(&self) -> CoreResult<Vec<String>> {
        Ok(self.products.iter().map(|job| job.product.id.clone()).collect())
    }

    async fn load_product(&self, id: &str) -> CoreResult<ProductJob> {
        self.products
            .iter()
            .find(|job| job.product.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("product {}", id)))
    }
}

use serde::{Deserialize, Serialize};
use repricer_catalog::DeliveryTime;
use std::collections::HashSet;

/// A competitor listing as scraped from the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferItem {
    pub seller: String,
    /// Total listed price for `quantity` units
    pub price: f64,
    pub quantity: u64,
    #[serde(default)]
    pub delivery_time: Option<DeliveryTime>,
    #[serde(default)]
    pub min_unit: Option<u64>,
    #[serde(default)]
    pub min_stock: Option<u64>,
}

impl OfferItem {
    pub fn new(seller: impl Into<String>, price: f64, quantity: u64) -> Self {
        Self {
            seller: seller.into(),
            price,
            quantity,
            delivery_time: None,
            min_unit: None,
            min_stock: None,
        }
    }

    /// Price per unit; `None` for zero-quantity listings
    pub fn unit_price(&self) -> Option<f64> {
        if self.quantity == 0 {
            None
        } else {
            Some(self.price / self.quantity as f64)
        }
    }

    /// Per-unit view of this listing, leaving the original untouched
    pub fn normalized(&self) -> Option<UnitOffer> {
        self.unit_price().map(|unit_price| UnitOffer {
            offer: self.clone(),
            unit_price,
        })
    }
}

/// A listing together with its per-unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOffer {
    pub offer: OfferItem,
    pub unit_price: f64,
}

impl UnitOffer {
    pub fn seller(&self) -> &str {
        &self.offer.seller
    }
}

/// Sellers we never compare against; exact, case-sensitive match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Blacklist {
    sellers: HashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(sellers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sellers: sellers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, seller: &str) -> bool {
        self.sellers.contains(seller)
    }

    pub fn len(&self) -> usize {
        self.sellers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sellers.is_empty()
    }
}

impl From<Vec<String>> for Blacklist {
    fn from(sellers: Vec<String>) -> Self {
        Self::new(sellers)
    }
}

impl From<Blacklist> for Vec<String> {
    fn from(blacklist: Blacklist) -> Self {
        let mut sellers: Vec<String> = blacklist.sellers.into_iter().collect();
        sellers.sort();
        sellers
    }
}

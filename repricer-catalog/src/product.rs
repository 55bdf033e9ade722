use serde::{Deserialize, Deserializer, Serialize};
use crate::delivery::DeliveryTime;
use crate::inventory::StockType;
use crate::pricing::smallest_unit;
use crate::sheet::{CellRef, SENTINEL};

/// Min/max price pair for one regime; `None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceBounds {
    #[serde(default, deserialize_with = "raw_bound")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "raw_bound")]
    pub max: Option<f64>,
}

fn unset_bound(value: f64) -> Option<f64> {
    (value != SENTINEL).then_some(value)
}

fn raw_bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.and_then(unset_bound))
}

impl PriceBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build from raw sheet values where `-1` marks an unset bound
    pub fn from_raw(min: f64, max: f64) -> Self {
        Self {
            min: unset_bound(min),
            max: unset_bound(max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let mut value = value;
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        value
    }

    /// Raw form for reports, `-1` for unset bounds
    pub fn to_raw(&self) -> (f64, f64) {
        (self.min.unwrap_or(SENTINEL), self.max.unwrap_or(SENTINEL))
    }

    fn validate(&self, regime: StockType, unit: f64) -> Result<(), ProductError> {
        for value in [self.min, self.max].into_iter().flatten() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ProductError::InvalidBound { regime, value });
            }
            if value < unit {
                return Err(ProductError::BoundBelowUnit { regime, value, unit });
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ProductError::InvertedBounds { regime, min, max });
            }
        }
        Ok(())
    }
}

/// Bounds per regime
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegimeBounds {
    pub stock_1: PriceBounds,
    pub stock_2: PriceBounds,
    pub stock_fake: PriceBounds,
}

impl RegimeBounds {
    pub fn for_regime(&self, regime: StockType) -> PriceBounds {
        match regime {
            StockType::Stock1 => self.stock_1,
            StockType::Stock2 => self.stock_2,
            StockType::StockFake => self.stock_fake,
        }
    }
}

/// Range the per-run price jitter is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min: f64,
    pub max: f64,
}

/// Static pricing configuration of one listed product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Rows with the run flag off are skipped by the batch
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Reference passed to the offer provider
    pub compare_ref: String,
    pub delivery_time: DeliveryTime,
    pub min_unit: u64,
    pub min_stock: u64,
    /// Decimal places the posted price is rounded to
    pub precision: i32,
    pub jitter: JitterRange,
    #[serde(default)]
    pub bounds: RegimeBounds,
    #[serde(default)]
    pub blacklist_ref: Option<CellRef>,
}

fn default_enabled() -> bool { true }

const MAX_PRECISION: i32 = 8;

impl Product {
    pub fn bounds_for(&self, regime: StockType) -> PriceBounds {
        self.bounds.for_regime(regime)
    }

    pub fn smallest_unit(&self) -> f64 {
        smallest_unit(self.precision)
    }

    /// Reject configurations the pricing algorithm cannot honor
    pub fn validate(&self) -> Result<(), ProductError> {
        if !(-MAX_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return Err(ProductError::InvalidPrecision(self.precision));
        }

        let JitterRange { min, max } = self.jitter;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(ProductError::InvalidJitter { min, max });
        }

        let unit = self.smallest_unit();
        for regime in [StockType::Stock1, StockType::Stock2, StockType::StockFake] {
            self.bounds_for(regime).validate(regime, unit)?;
        }
        Ok(())
    }
}

/// Configuration errors; never retried
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductError {
    #[error("Invalid jitter range: [{min}, {max}]")]
    InvalidJitter { min: f64, max: f64 },

    #[error("Invalid {regime} bound: {value}")]
    InvalidBound { regime: StockType, value: f64 },

    #[error("Inverted {regime} bounds: min {min} above max {max}")]
    InvertedBounds { regime: StockType, min: f64, max: f64 },

    #[error("{regime} bound {value} is below the smallest price unit {unit}")]
    BoundBelowUnit { regime: StockType, value: f64, unit: f64 },

    #[error("Unsupported rounding precision: {0}")]
    InvalidPrecision(i32),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_product() -> Product {
        Product {
            id: "p-1".into(),
            name: "Gold x1000".into(),
            enabled: true,
            compare_ref: "gold-us-east".into(),
            delivery_time: DeliveryTime::from_minutes(60),
            min_unit: 10,
            min_stock: 100,
            precision: 2,
            jitter: JitterRange { min: 0.1, max: 0.5 },
            bounds: RegimeBounds::default(),
            blacklist_ref: None,
        }
    }

    #[test]
    fn test_from_raw_sentinel() {
        let bounds = PriceBounds::from_raw(-1.0, 12.0);
        assert_eq!(bounds, PriceBounds::new(None, Some(12.0)));
        assert_eq!(bounds.to_raw(), (-1.0, 12.0));
        assert!(PriceBounds::from_raw(-1.0, -1.0).is_unbounded());
    }

    #[test]
    fn test_clamp() {
        let bounds = PriceBounds::new(Some(8.0), Some(12.0));
        assert_eq!(bounds.clamp(5.0), 8.0);
        assert_eq!(bounds.clamp(15.0), 12.0);
        assert_eq!(bounds.clamp(9.5), 9.5);
        assert_eq!(PriceBounds::unbounded().clamp(-3.0), -3.0);
    }

    #[test]
    fn test_validate_accepts_sample() {
        let mut product = sample_product();
        product.bounds.stock_1 = PriceBounds::new(Some(8.0), Some(12.0));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut product = sample_product();
        product.bounds.stock_2 = PriceBounds::new(Some(12.0), Some(8.0));
        assert!(matches!(
            product.validate(),
            Err(ProductError::InvertedBounds { regime: StockType::Stock2, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut product = sample_product();
        product.bounds.stock_fake = PriceBounds::new(Some(-3.0), None);
        assert!(matches!(product.validate(), Err(ProductError::InvalidBound { .. })));

        let mut product = sample_product();
        product.bounds.stock_1 = PriceBounds::new(None, Some(0.001));
        assert!(matches!(product.validate(), Err(ProductError::BoundBelowUnit { .. })));

        let mut product = sample_product();
        product.jitter = JitterRange { min: 0.6, max: 0.5 };
        assert!(matches!(product.validate(), Err(ProductError::InvalidJitter { .. })));
    }

    #[test]
    fn test_product_from_json() {
        let json = serde_json::json!({
            "id": "p-9",
            "name": "Gold",
            "compare_ref": "gold-eu",
            "delivery_time": "1-3 hours",
            "min_unit": 5,
            "min_stock": 50,
            "precision": 3,
            "jitter": { "min": 0.01, "max": 0.02 },
            "bounds": {
                "stock_1": { "min": 1.0, "max": null },
                "stock_2": { "min": null, "max": null },
                "stock_fake": { "min": null, "max": 3.5 }
            }
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert!(product.enabled);
        assert_eq!(product.delivery_time.minutes(), 180);
        assert_eq!(product.bounds_for(StockType::StockFake).max, Some(3.5));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_product_from_json_with_sentinel_bounds() {
        let json = serde_json::json!({
            "id": "p-10",
            "name": "Gold",
            "compare_ref": "gold-eu",
            "delivery_time": "1 hour",
            "min_unit": 5,
            "min_stock": 50,
            "precision": 2,
            "jitter": { "min": 0.01, "max": 0.02 },
            "bounds": {
                "stock_1": { "min": -1.0, "max": 12.0 },
                "stock_2": { "min": -1, "max": -1 },
                "stock_fake": { "min": -1.0, "max": -1.0 }
            }
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert!(product.validate().is_ok());
        assert_eq!(product.bounds_for(StockType::Stock1), PriceBounds::new(None, Some(12.0)));
        assert!(product.bounds_for(StockType::Stock2).is_unbounded());
        assert!(product.bounds_for(StockType::StockFake).is_unbounded());
        assert_eq!(product.bounds_for(StockType::StockFake).to_raw(), (-1.0, -1.0));
    }

    #[test]
    fn test_missing_bound_fields_are_unbounded() {
        let bounds: PriceBounds = serde_json::from_str(r#"{"max": 4.0}"#).unwrap();
        assert_eq!(bounds, PriceBounds::new(None, Some(4.0)));
    }
}

use serde::{Deserialize, Serialize};
use crate::sheet::CellRef;

/// One internal supply-price source used to cost stock we do not hold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplySource {
    pub label: String,
    pub enabled: bool,
    pub price_cell: CellRef,
    pub profit_multiplier: f64,
    #[serde(default = "unit_factor")]
    pub unit_conversion: f64,
    #[serde(default = "unit_factor")]
    pub discount_fee: f64,
    /// Raw price is quoted in a foreign currency and needs the batch rate
    #[serde(default)]
    pub currency_denominated: bool,
}

fn unit_factor() -> f64 { 1.0 }

impl SupplySource {
    /// Per-unit cost for a raw reading. `None` when the source needs a
    /// currency rate that is not available.
    pub fn cost(&self, raw_price: f64, rate: Option<f64>) -> Option<f64> {
        let base = raw_price * self.profit_multiplier * self.unit_conversion * self.discount_fee;
        if self.currency_denominated {
            rate.map(|r| base * r)
        } else {
            Some(base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(currency_denominated: bool) -> SupplySource {
        SupplySource {
            label: "wholesale".into(),
            enabled: true,
            price_cell: CellRef::new("s", "Prices", "C3"),
            profit_multiplier: 1.2,
            unit_conversion: 0.5,
            discount_fee: 1.0,
            currency_denominated,
        }
    }

    #[test]
    fn test_direct_cost() {
        let cost = source(false).cost(10.0, None).unwrap();
        assert!((cost - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_currency_cost_needs_rate() {
        let src = source(true);
        assert_eq!(src.cost(10.0, None), None);
        assert!((src.cost(10.0, Some(3.5)).unwrap() - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_discount_fee_defaults_to_one() {
        let json = serde_json::json!({
            "label": "market",
            "enabled": true,
            "price_cell": { "sheet_id": "s", "tab": "P", "cell": "A1" },
            "profit_multiplier": 2.0
        });
        let src: SupplySource = serde_json::from_value(json).unwrap();
        assert_eq!(src.discount_fee, 1.0);
        assert_eq!(src.unit_conversion, 1.0);
        assert!(!src.currency_denominated);
    }
}

use serde::{Deserialize, Serialize};
use crate::sheet::CellRef;

/// Reading value for a counter that could not be read or is not configured
pub const STOCK_UNAVAILABLE: i64 = -1;

/// Supply regime governing a pricing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockType {
    #[serde(rename = "stock_1")]
    Stock1,
    #[serde(rename = "stock_2")]
    Stock2,
    #[serde(rename = "stock_fake")]
    StockFake,
}

impl std::fmt::Display for StockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StockType::Stock1 => "stock_1",
            StockType::Stock2 => "stock_2",
            StockType::StockFake => "stock_fake",
        };
        f.write_str(name)
    }
}

/// Where the two stock counters live and the thresholds that switch regimes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInfo {
    pub stock_1: CellRef,
    pub stock_2: CellRef,
    pub limit_1: i64,
    pub limit_2: i64,
    /// Quantity posted when neither counter qualifies
    #[serde(default)]
    pub fallback: i64,
}

/// Raw counters as read for this run (`-1` when unavailable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReadings {
    pub stock_1: i64,
    pub stock_2: i64,
}

/// Immutable snapshot of the counters used by one run; attached to the result for audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub stock_1: i64,
    pub stock_2: i64,
    pub stock_fake: i64,
}

/// Pick the regime for a pair of readings. Total over all inputs; a
/// qualifying `stock_2` always wins over a qualifying `stock_1`.
pub fn classify(
    stock_1: i64,
    stock_2: i64,
    limit_1: i64,
    limit_2: i64,
    fallback: i64,
) -> (StockType, StockSnapshot) {
    let snapshot = StockSnapshot {
        stock_1,
        stock_2,
        stock_fake: fallback,
    };

    let mut stock_type = StockType::StockFake;
    if stock_1 != STOCK_UNAVAILABLE && stock_1 >= limit_1 {
        stock_type = StockType::Stock1;
    }
    if stock_2 != STOCK_UNAVAILABLE && stock_2 >= limit_2 {
        stock_type = StockType::Stock2;
    }
    (stock_type, snapshot)
}

impl StockInfo {
    pub fn classify(&self, readings: StockReadings) -> (StockType, StockSnapshot) {
        classify(
            readings.stock_1,
            readings.stock_2,
            self.limit_1,
            self.limit_2,
            self.fallback,
        )
    }

    /// Both counters can be fetched in a single batched read
    pub fn shares_sheet(&self) -> bool {
        self.stock_1.sheet_id == self.stock_2.sheet_id
    }

    /// Quantity to list on the marketplace. Checks `stock_1` first, then
    /// `stock_2`; a zero or unavailable counter never qualifies.
    pub fn posted_stock(&self, snapshot: &StockSnapshot) -> i64 {
        let qualifies = |value: i64, limit: i64| value > 0 && value >= limit;

        if qualifies(snapshot.stock_1, self.limit_1) {
            snapshot.stock_1
        } else if qualifies(snapshot.stock_2, self.limit_2) {
            snapshot.stock_2
        } else {
            snapshot.stock_fake
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(limit_1: i64, limit_2: i64, fallback: i64) -> StockInfo {
        StockInfo {
            stock_1: CellRef::new("s", "Stock", "A1"),
            stock_2: CellRef::new("s", "Stock", "A2"),
            limit_1,
            limit_2,
            fallback,
        }
    }

    #[test]
    fn test_stock_1_qualifies_alone() {
        let (regime, snapshot) = classify(150, 50, 100, 200, 10);
        assert_eq!(regime, StockType::Stock1);
        assert_eq!(snapshot, StockSnapshot { stock_1: 150, stock_2: 50, stock_fake: 10 });
    }

    #[test]
    fn test_stock_2_overrides_stock_1() {
        let (regime, _) = classify(150, 300, 100, 200, 10);
        assert_eq!(regime, StockType::Stock2);
    }

    #[test]
    fn test_default_is_stock_fake() {
        assert_eq!(classify(99, 199, 100, 200, 10).0, StockType::StockFake);
    }

    #[test]
    fn test_sentinel_never_qualifies() {
        // A limit at or below -1 would otherwise let the sentinel through.
        assert_eq!(classify(-1, -1, -5, -5, 0).0, StockType::StockFake);
        assert_eq!(classify(-1, 0, -5, -5, 0).0, StockType::Stock2);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let stock = info(100, 200, 10);
        let readings = StockReadings { stock_1: 120, stock_2: 250 };
        assert_eq!(stock.classify(readings), stock.classify(readings));
    }

    #[test]
    fn test_posted_stock() {
        let stock = info(100, 200, 10);
        let snap = |a, b| StockSnapshot { stock_1: a, stock_2: b, stock_fake: 10 };

        assert_eq!(stock.posted_stock(&snap(150, 300)), 150);
        assert_eq!(stock.posted_stock(&snap(50, 300)), 300);
        assert_eq!(stock.posted_stock(&snap(50, 50)), 10);
        assert_eq!(stock.posted_stock(&snap(-1, -1)), 10);
    }

    #[test]
    fn test_shares_sheet() {
        let mut stock = info(1, 1, 0);
        assert!(stock.shares_sheet());
        stock.stock_2.sheet_id = "other".into();
        assert!(!stock.shares_sheet());
    }
}

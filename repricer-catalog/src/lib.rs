pub mod sheet;
pub mod delivery;
pub mod product;
pub mod pricing;
pub mod inventory;
pub mod supply;

pub use sheet::{CellRef, CellValue, CellError};
pub use delivery::{DeliveryTime, DeliveryTimeError};
pub use product::{Product, PriceBounds, RegimeBounds, JitterRange, ProductError};
pub use pricing::{JitterSource, RandomJitter, SequenceJitter, round_price, fit_to_bounds};
pub use inventory::{StockType, StockInfo, StockReadings, StockSnapshot, classify};
pub use supply::SupplySource;

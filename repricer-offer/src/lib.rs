pub mod models;
pub mod rules;

pub use models::{OfferItem, UnitOffer, Blacklist};
pub use rules::{OfferFilter, RejectReason, filter, min_offer};

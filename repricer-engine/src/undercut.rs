//! The undercut pricing algorithm.
//!
//! A decision starts from the cheapest valid competitor listing (the
//! baseline), derives a candidate price from the active stock regime,
//! re-applies the regime bounds, and finally tries to slot in just below the
//! next seller up. Every "cannot price this run" path yields `Ok(None)`.

use repricer_catalog::{
    fit_to_bounds, round_price, JitterSource, PriceBounds, Product, StockInfo, StockReadings, StockType,
};
use repricer_offer::{filter, min_offer, Blacklist, OfferItem, UnitOffer};
use tracing::debug;
use crate::aggregator::{aggregate, SourceCost};
use crate::decision::{PriceInfo, Reference};
use crate::error::EngineError;

/// Inputs of a single decision, all resolved by collaborators beforehand
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub product: &'a Product,
    pub stock: &'a StockInfo,
    pub readings: StockReadings,
    pub offers: &'a [OfferItem],
    /// Collected supply costs; only consulted in the stock_fake regime
    pub supply: &'a [Option<SourceCost>],
    pub blacklist: &'a Blacklist,
}

pub struct UndercutEngine<J> {
    jitter: J,
}

impl<J: JitterSource> UndercutEngine<J> {
    pub fn new(jitter: J) -> Self {
        Self { jitter }
    }

    pub fn decide(&mut self, input: &DecisionInput<'_>) -> Result<Option<PriceInfo>, EngineError> {
        let product = input.product;
        product.validate()?;

        let (stock_type, stock) = input.stock.classify(input.readings);

        let Some(baseline) = baseline_offer(product, input.offers, input.blacklist) else {
            return Ok(None);
        };

        let bounds = product.bounds_for(stock_type);
        let precision = product.precision;
        let jitter = self.jitter.draw(&product.jitter);

        let (candidate, supply) = match stock_type {
            StockType::StockFake => {
                let aggregated = aggregate(input.supply.to_vec())?;
                let cost = aggregated.cheapest.cost;

                let candidate = if bounds.is_unbounded() {
                    let Some(closest) = closest_to_cost(input.offers, input.blacklist, cost) else {
                        debug!("No comparable offers near cost for product {}", product.id);
                        return Ok(None);
                    };
                    // Floored at the raw cost. Rounding and the next-seller pass can still post below it.
                    round_price(closest - jitter, precision).max(cost)
                } else {
                    snap_or(cost, &bounds, || round_price(cost + jitter, precision))
                };
                (candidate, Some(aggregated))
            }
            StockType::Stock1 | StockType::Stock2 => {
                let unit = baseline.unit_price;
                let candidate = snap_or(unit, &bounds, || round_price(unit - jitter, precision));
                (candidate, None)
            }
        };

        let floor = baseline.unit_price - jitter;
        let mut adjusted_price = fit_to_bounds(candidate.max(floor), &bounds, precision);
        let mut reference = Reference {
            seller: baseline.seller().to_string(),
            price: baseline.unit_price,
        };

        let margin = self.jitter.draw(&product.jitter);
        if let Some(next) = next_seller_up(input.offers, input.blacklist, adjusted_price) {
            let undercut = next.unit_price - margin;
            if undercut > 0.0 {
                debug!(
                    "Product {}: undercutting {} at {} (was {})",
                    product.id,
                    next.seller(),
                    next.unit_price,
                    adjusted_price
                );
                adjusted_price = fit_to_bounds(undercut, &bounds, precision);
                reference = Reference {
                    seller: next.seller().to_string(),
                    price: next.unit_price,
                };
            }
        }

        Ok(Some(PriceInfo {
            bounds,
            adjusted_price,
            baseline,
            stock_type,
            stock,
            reference,
            jitter,
            supply,
        }))
    }
}

/// Cheapest valid listing per unit, the anchor of every decision
pub fn baseline_offer(product: &Product, offers: &[OfferItem], blacklist: &Blacklist) -> Option<UnitOffer> {
    let valid = filter(product, offers, blacklist);
    let Some(cheapest) = min_offer(&valid) else {
        debug!("No valid offers for product {}", product.id);
        return None;
    };
    let baseline = cheapest.normalized();
    if baseline.is_none() {
        debug!("Baseline offer for product {} has zero quantity", product.id);
    }
    baseline
}

/// Snap to whichever bound `value` violates, otherwise use `within`
fn snap_or(value: f64, bounds: &PriceBounds, within: impl FnOnce() -> f64) -> f64 {
    match (bounds.min, bounds.max) {
        (Some(min), _) if value < min => min,
        (_, Some(max)) if value > max => max,
        _ => within(),
    }
}

/// Per-unit price closest to `cost` among non-blacklisted, positive-quantity
/// listings; first occurrence wins on equal distance.
fn closest_to_cost(offers: &[OfferItem], blacklist: &Blacklist, cost: f64) -> Option<f64> {
    offers
        .iter()
        .filter(|offer| !blacklist.contains(&offer.seller))
        .filter_map(OfferItem::unit_price)
        .min_by(|a, b| (a - cost).abs().total_cmp(&(b - cost).abs()))
}

/// Cheapest non-blacklisted listing strictly above `candidate`.
///
/// `None` ("keep") when the cheapest listing overall is already at or below
/// the candidate, or when nothing qualifies.
fn next_seller_up(offers: &[OfferItem], blacklist: &Blacklist, candidate: f64) -> Option<UnitOffer> {
    let mut sorted: Vec<UnitOffer> = offers.iter().filter_map(OfferItem::normalized).collect();
    sorted.sort_by(|a, b| a.unit_price.total_cmp(&b.unit_price));

    if sorted.first()?.unit_price <= candidate {
        return None;
    }
    sorted
        .into_iter()
        .find(|offer| offer.unit_price > candidate && !blacklist.contains(offer.seller()))
}

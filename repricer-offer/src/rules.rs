use repricer_catalog::Product;
use tracing::debug;
use crate::models::{Blacklist, OfferItem};

/// Why a listing was left out of the comparison set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingDeliveryTime,
    TooSlow,
    Blacklisted,
    MinUnitTooHigh,
    MinStockTooLow,
}

/// Validates competitor listings against a product's constraints
pub struct OfferFilter<'a> {
    product: &'a Product,
    blacklist: &'a Blacklist,
}

impl<'a> OfferFilter<'a> {
    pub fn new(product: &'a Product, blacklist: &'a Blacklist) -> Self {
        Self { product, blacklist }
    }

    pub fn check(&self, offer: &OfferItem) -> Result<(), RejectReason> {
        let delivery = offer.delivery_time.ok_or(RejectReason::MissingDeliveryTime)?;
        if !delivery.is_not_slower_than(&self.product.delivery_time) {
            return Err(RejectReason::TooSlow);
        }
        if self.blacklist.contains(&offer.seller) {
            return Err(RejectReason::Blacklisted);
        }
        match offer.min_unit {
            Some(min_unit) if min_unit <= self.product.min_unit => {}
            _ => return Err(RejectReason::MinUnitTooHigh),
        }
        match offer.min_stock {
            Some(min_stock) if min_stock >= self.product.min_stock => {}
            _ => return Err(RejectReason::MinStockTooLow),
        }
        Ok(())
    }

    pub fn is_valid(&self, offer: &OfferItem) -> bool {
        self.check(offer).is_ok()
    }

    /// Keep passing listings in their original order
    pub fn filter(&self, offers: &[OfferItem]) -> Vec<OfferItem> {
        offers
            .iter()
            .filter(|offer| match self.check(offer) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(product = %self.product.id, seller = %offer.seller, ?reason, "Offer rejected");
                    false
                }
            })
            .cloned()
            .collect()
    }
}

pub fn filter(product: &Product, offers: &[OfferItem], blacklist: &Blacklist) -> Vec<OfferItem> {
    OfferFilter::new(product, blacklist).filter(offers)
}

/// Cheapest listing by per-unit price, first occurrence on ties.
///
/// Zero-quantity listings cannot be ranked; when nothing else is left the
/// first of them is returned so the caller's zero-quantity guard applies.
pub fn min_offer(filtered: &[OfferItem]) -> Option<&OfferItem> {
    let ranked = filtered
        .iter()
        .filter_map(|offer| offer.unit_price().map(|unit| (offer, unit)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(offer, _)| offer);

    ranked.or_else(|| filtered.first())
}

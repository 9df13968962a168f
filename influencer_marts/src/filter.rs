//! Consistent narrowing of the three marts by a user selection.
//!
//! The orders mart is filtered directly (date, brand, product, platform).
//! Performance and payment rows are then narrowed by membership in the set of
//! influencers that appear in the filtered orders, never by predicates on
//! their own attributes. Payments are additionally cut to the date range.
//!
//! The platform set may contain [`ORGANIC_PLATFORM`]. That token matches
//! orders without a platform (null or empty) and never a stored platform
//! value, even one literally spelled "Organic".

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::marts::{EnrichedOrder, InfluencerPerformance, Marts, PaymentLogEntry};

/// Platform token selecting orders with no recorded platform.
pub const ORGANIC_PLATFORM: &str = "Organic";

/// Date range and inclusion sets chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// First order date included.
    pub start: NaiveDate,
    /// Last order date included.
    pub end: NaiveDate,
    /// Brands to keep. Orders without a brand never match.
    pub brands: HashSet<String>,
    /// Products to keep.
    pub products: HashSet<String>,
    /// Platforms to keep, optionally with [`ORGANIC_PLATFORM`].
    pub platforms: HashSet<String>,
}

fn is_organic_platform(platform: Option<&str>) -> bool {
    platform.is_none_or(str::is_empty)
}

impl Selection {
    /// Dashboard default: the full order-date range and every distinct brand,
    /// product and platform of `marts`. The organic token is added when some
    /// orders carry no platform.
    ///
    /// Orders without a brand, or stored under a platform literally named
    /// "Organic", are still excluded by this selection.
    pub fn everything(marts: &Marts) -> Self {
        let start = marts.orders.iter().map(|o| o.order_date).min();
        let end = marts.orders.iter().map(|o| o.order_date).max();

        let mut platforms = HashSet::new();
        for o in &marts.orders {
            match o.platform.as_deref() {
                p if is_organic_platform(p) => {
                    platforms.insert(ORGANIC_PLATFORM.to_string());
                }
                Some(p) => {
                    platforms.insert(p.to_string());
                }
                None => {}
            }
        }

        Self {
            start: start.unwrap_or(NaiveDate::MIN),
            end: end.unwrap_or(NaiveDate::MAX),
            brands: marts.orders.iter().filter_map(|o| o.brand.clone()).collect(),
            products: marts.orders.iter().map(|o| o.product.clone()).collect(),
            platforms,
        }
    }

    fn platform_matches(&self, platform: Option<&str>) -> bool {
        if is_organic_platform(platform) {
            return self.platforms.contains(ORGANIC_PLATFORM);
        }
        // Non-empty here; a stored "Organic" is a real platform, not the token.
        platform.is_some_and(|p| p != ORGANIC_PLATFORM && self.platforms.contains(p))
    }

    /// True when `order` satisfies the date, brand, product and platform predicates.
    pub fn matches(&self, order: &EnrichedOrder) -> bool {
        (self.start..=self.end).contains(&order.order_date)
            && order.brand.as_ref().is_some_and(|b| self.brands.contains(b))
            && self.products.contains(&order.product)
            && self.platform_matches(order.platform.as_deref())
    }
}

/// Borrowed subset of the marts produced by [`apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    /// Orders satisfying the selection.
    pub orders: Vec<&'a EnrichedOrder>,
    /// Performance rows of influencers present in `orders`.
    pub performance: Vec<&'a InfluencerPerformance>,
    /// Payments inside the date range for influencers present in `orders`.
    pub payments: Vec<&'a PaymentLogEntry>,
    /// Distinct non-null influencer ids of `orders`.
    pub influencer_ids: BTreeSet<&'a str>,
}

/// Narrow `marts` to `selection`.
///
/// An inverted date range (`start > end`) matches nothing.
pub fn apply<'a>(marts: &'a Marts, selection: &Selection) -> FilteredView<'a> {
    let orders: Vec<&EnrichedOrder> =
        marts.orders.iter().filter(|o| selection.matches(o)).collect();

    let influencer_ids: BTreeSet<&str> = orders
        .iter()
        .filter_map(|o| o.influencer_id.as_deref())
        .collect();

    let performance = marts
        .performance
        .iter()
        .filter(|p| influencer_ids.contains(p.influencer_id.as_str()))
        .collect();

    let payments: Vec<&PaymentLogEntry> = marts
        .payments
        .iter()
        .filter(|p| {
            (selection.start..=selection.end).contains(&p.invoice_date)
                && influencer_ids.contains(p.influencer_id.as_str())
        })
        .collect();

    tracing::debug!(
        orders = orders.len(),
        influencers = influencer_ids.len(),
        payments = payments.len(),
        "applied selection"
    );

    FilteredView {
        orders,
        performance,
        payments,
        influencer_ids,
    }
}

//! The three derived relations, rebuilt together from one raw snapshot.
//!
//! Data flows one way:
//! raw snapshot -> payment log -> {enriched orders, influencer performance}.
//! Nothing here mutates a mart after it has been built; a rebuild produces a
//! fresh [`Marts`] value.

pub mod orders;
pub mod payments;
pub mod performance;

use std::collections::HashMap;

use serde::Serialize;

use crate::config::PayoutRates;
use crate::raw::{Influencer, RawData};

pub use orders::{EnrichedOrder, enrich_orders};
pub use payments::{PaymentLogEntry, build_payment_log};
pub use performance::{InfluencerPerformance, aggregate_performance};

/// Influencers keyed by id. The first row wins on duplicate ids.
pub(crate) fn influencer_index(raw: &RawData) -> HashMap<&str, &Influencer> {
    let mut by_id = HashMap::with_capacity(raw.influencers.len());
    for inf in &raw.influencers {
        by_id.entry(inf.influencer_id.as_str()).or_insert(inf);
    }
    by_id
}

/// Payment log, enriched orders and influencer performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marts {
    /// One entry per compensable event.
    pub payments: Vec<PaymentLogEntry>,
    /// One row per tracking record.
    pub orders: Vec<EnrichedOrder>,
    /// One row per influencer.
    pub performance: Vec<InfluencerPerformance>,
}

impl Marts {
    /// Build every mart from `raw` with the given rates.
    ///
    /// `rates` must pass [`PayoutRates::validate`]; a zero tier size turns
    /// every post fee above the threshold into infinity. [`crate::cache::MartCache::refresh`]
    /// checks this before building.
    pub fn build(raw: &RawData, rates: &PayoutRates) -> Self {
        raw.warn_on_segmentation_mismatch(rates.segmentation_threshold);

        let payments = build_payment_log(raw, rates);
        let orders = enrich_orders(raw, rates);
        let performance = aggregate_performance(raw, &payments, rates);

        tracing::info!(
            payments = payments.len(),
            orders = orders.len(),
            performance = performance.len(),
            "built marts"
        );
        Self {
            payments,
            orders,
            performance,
        }
    }

    /// Total of every payment-log amount.
    pub fn total_payout(&self) -> f64 {
        self.payments.iter().map(|p| p.payment_amount).sum()
    }
}

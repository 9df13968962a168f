//! Influencer performance: one row per influencer, zero-filled.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::payments::{PaymentLogEntry, round_to};
use crate::config::PayoutRates;
use crate::raw::{PayoutBasis, RawData};

/// Aggregated totals and ratios for one influencer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluencerPerformance {
    /// Influencer id.
    pub influencer_id: String,
    /// Display name.
    pub influencer: String,
    /// Compensation rule.
    pub payout_type: PayoutBasis,
    /// Posts published, sponsored or not.
    pub posts: u64,
    /// Total reach over all posts.
    pub reach: u64,
    /// Total likes.
    pub likes: u64,
    /// Total comments.
    pub comments: u64,
    /// `(likes + comments) * 100 / reach`, 2 decimals; 0 without reach.
    pub engagement_rate: f64,
    /// Influenced orders.
    pub orders: i64,
    /// Influenced revenue.
    pub revenue: f64,
    /// Sum of payment-log amounts.
    pub payout: f64,
    /// Revenue net of cost of goods.
    pub gross_profit: f64,
    /// Gross profit minus payout.
    pub net_profit: f64,
    /// Revenue per unit of payout, whole number; 0 without payout.
    pub roas: f64,
    /// Net profit as a percentage of payout, whole number; 0 without payout.
    pub roi: f64,
}

#[derive(Default)]
struct PostTotals {
    posts: u64,
    reach: u64,
    likes: u64,
    comments: u64,
}

#[derive(Default)]
struct OrderTotals {
    orders: i64,
    revenue: f64,
}

/// Ratio with the zero-denominator policy applied.
fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

/// Roll up posts, influenced orders and payouts per influencer.
///
/// Rows are ordered by `influencer_id`. Influencers without activity still
/// get a row with every total at 0.
pub fn aggregate_performance(
    raw: &RawData,
    payments: &[PaymentLogEntry],
    rates: &PayoutRates,
) -> Vec<InfluencerPerformance> {
    let mut post_totals: HashMap<&str, PostTotals> = HashMap::new();
    for p in &raw.posts {
        let t = post_totals.entry(p.influencer_id.as_str()).or_default();
        t.posts += 1;
        t.reach = t.reach.saturating_add(p.reach);
        t.likes = t.likes.saturating_add(p.likes);
        t.comments = t.comments.saturating_add(p.comments);
    }

    let mut order_totals: HashMap<&str, OrderTotals> = HashMap::new();
    for rec in raw.tracking.iter().filter(|r| r.attribution_type.is_influenced()) {
        let Some(id) = rec.influencer_id.as_deref() else {
            continue;
        };
        let t = order_totals.entry(id).or_default();
        t.orders += rec.orders;
        t.revenue += rec.revenue_or_zero();
    }

    let mut payout_totals: HashMap<&str, f64> = HashMap::new();
    for e in payments {
        *payout_totals.entry(e.influencer_id.as_str()).or_default() += e.payment_amount;
    }

    // BTreeMap keeps id order and drops duplicate ids after the first.
    let mut rows: BTreeMap<&str, InfluencerPerformance> = BTreeMap::new();
    for inf in &raw.influencers {
        let id = inf.influencer_id.as_str();
        if rows.contains_key(id) {
            continue;
        }
        let posts = post_totals.remove(id).unwrap_or_default();
        let orders = order_totals.remove(id).unwrap_or_default();
        let payout = payout_totals.get(id).copied().unwrap_or(0.0);

        let engagement_rate = round_to(
            ratio_or_zero(
                (posts.likes as f64 + posts.comments as f64) * 100.0,
                posts.reach as f64,
            ),
            2,
        );
        let gross_profit = orders.revenue * (1.0 - rates.cost_of_goods_ratio);
        let net_profit = gross_profit - payout;

        rows.insert(
            id,
            InfluencerPerformance {
                influencer_id: inf.influencer_id.clone(),
                influencer: inf.name.clone(),
                payout_type: inf.payout_basis,
                posts: posts.posts,
                reach: posts.reach,
                likes: posts.likes,
                comments: posts.comments,
                engagement_rate,
                orders: orders.orders,
                revenue: orders.revenue,
                payout,
                gross_profit,
                net_profit,
                roas: round_to(ratio_or_zero(orders.revenue, payout), 0),
                roi: round_to(ratio_or_zero(net_profit * 100.0, payout), 0),
            },
        );
    }

    rows.into_values().collect()
}

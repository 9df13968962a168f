//! Enriched orders: every tracking record with its post and influencer attached.
//!
//! Joins are left joins. Organic orders and influenced orders whose post or
//! influencer cannot be found keep their row with `None` in the joined
//! columns, so the output always has exactly one row per tracking record.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PayoutRates;
use crate::raw::{AttributionType, PayoutBasis, Post, RawData};
use crate::source::post_id_from_source;

/// One denormalized order fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedOrder {
    /// Campaign from the tracking record.
    pub campaign: Option<String>,
    /// Attributed influencer from the tracking record.
    pub influencer_id: Option<String>,
    /// Product name.
    pub product: String,
    /// Order date.
    pub order_date: NaiveDate,
    /// Order count.
    pub orders: i64,
    /// Revenue, 0 when missing.
    pub revenue_generated: f64,
    /// Revenue × cost-of-goods ratio, truncated to a whole amount.
    pub cost_of_goods: f64,
    /// Revenue minus cost of goods.
    pub gross_profit: f64,
    /// Attribution label.
    pub attribution_type: AttributionType,
    /// Post id parsed from the tracking source.
    pub post_id: Option<String>,
    /// Platform of the matched post; `None` for organic or unmatched orders.
    pub platform: Option<String>,
    /// Date of the matched post.
    pub post_date: Option<NaiveDate>,
    /// Reach of the matched post.
    pub reach: Option<u64>,
    /// Likes of the matched post.
    pub likes: Option<u64>,
    /// Comments of the matched post.
    pub comments: Option<u64>,
    /// Brand from the tracking record.
    pub brand: Option<String>,
    /// Influencer name.
    pub name: Option<String>,
    /// Influencer category.
    pub category: Option<String>,
    /// Influencer gender.
    pub gender: Option<String>,
    /// Influencer follower count.
    pub follower_count: Option<u64>,
    /// Influencer payout basis.
    pub payout_type: Option<PayoutBasis>,
}

/// Whole-unit cost of goods for a revenue amount (truncates toward zero).
pub fn cost_of_goods(revenue: f64, rates: &PayoutRates) -> f64 {
    (revenue * rates.cost_of_goods_ratio).trunc()
}

/// Build the enriched-orders relation, sorted by order date (stable on ties).
pub fn enrich_orders(raw: &RawData, rates: &PayoutRates) -> Vec<EnrichedOrder> {
    let mut posts: HashMap<(&str, &str), &Post> = HashMap::with_capacity(raw.posts.len());
    for p in &raw.posts {
        posts
            .entry((p.influencer_id.as_str(), p.post_id.as_str()))
            .or_insert(p);
    }
    let influencers = super::influencer_index(raw);

    let mut out: Vec<EnrichedOrder> = raw
        .tracking
        .iter()
        .map(|rec| {
            let post_id = post_id_from_source(&rec.source);
            let inf_id = rec.influencer_id.as_deref();
            let post = inf_id
                .zip(post_id)
                .and_then(|key| posts.get(&key).copied());
            let inf = inf_id.and_then(|id| influencers.get(id).copied());

            let revenue = rec.revenue_or_zero();
            let cogs = cost_of_goods(revenue, rates);

            EnrichedOrder {
                campaign: rec.campaign.clone(),
                influencer_id: rec.influencer_id.clone(),
                product: rec.product.clone(),
                order_date: rec.date,
                orders: rec.orders,
                revenue_generated: revenue,
                cost_of_goods: cogs,
                gross_profit: revenue - cogs,
                attribution_type: rec.attribution_type.clone(),
                post_id: post_id.map(str::to_string),
                platform: post.map(|p| p.platform.clone()),
                post_date: post.map(|p| p.date),
                reach: post.map(|p| p.reach),
                likes: post.map(|p| p.likes),
                comments: post.map(|p| p.comments),
                brand: rec.brand.clone(),
                name: inf.map(|i| i.name.clone()),
                category: inf.map(|i| i.category.clone()),
                gender: inf.map(|i| i.gender.clone()),
                follower_count: inf.map(|i| i.follower_count),
                payout_type: inf.map(|i| i.payout_basis),
            }
        })
        .collect();

    out.sort_by_key(|o| o.order_date);
    out
}

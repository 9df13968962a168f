//! Payment log: one entry per compensable event.
//!
//! Two payout bases feed the log:
//! - `Post` influencers earn a per-post fee for **every** post, sponsored or
//!   not. The fee grows with a fractional tier count above the segmentation
//!   threshold: `(followers - threshold) / tier_size` is real division, so the
//!   rate rises continuously rather than in steps. Below the threshold the
//!   tier term clamps to 0.
//! - `Order` influencers earn a commission on each influenced order.
//!
//! Influencers without a single post are left out entirely.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PayoutRates;
use crate::raw::{PayoutBasis, RawData};
use crate::source::post_id_from_source;

/// One row of the payment log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentLogEntry {
    /// `plog_post_<post_id>` or `plog_order_<user>_<product>_<date>`.
    pub payment_log_id: String,
    /// Paid influencer.
    pub influencer_id: String,
    /// Basis copied from the influencer.
    pub payment_basis: PayoutBasis,
    /// Post the payment relates to, when known.
    pub post_id: Option<String>,
    /// Post platform for per-post fees, tracking source for commissions.
    pub source: String,
    /// Post date or order date.
    pub invoice_date: NaiveDate,
    /// Amount, rounded to 2 decimals.
    pub payment_amount: f64,
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Per-post fee for a post-basis influencer.
pub fn post_payout_amount(follower_count: u64, rates: &PayoutRates) -> f64 {
    let followers = follower_count as f64;
    let tiers_above_base = ((followers - rates.segmentation_threshold as f64)
        / rates.tier_size as f64)
        .max(0.0);
    round_to(
        followers * (rates.base_multiplier + tiers_above_base * rates.progressive_increment),
        2,
    )
}

/// Commission on one influenced order for an order-basis influencer.
pub fn commission_amount(revenue: f64, rates: &PayoutRates) -> f64 {
    round_to(revenue * rates.commission_rate, 2)
}

/// Build the payment log from the raw snapshot.
///
/// Entries for post-basis influencers come first (raw post order), followed
/// by commissions (raw tracking order).
pub fn build_payment_log(raw: &RawData, rates: &PayoutRates) -> Vec<PaymentLogEntry> {
    let posting: HashSet<&str> = raw.posts.iter().map(|p| p.influencer_id.as_str()).collect();

    let by_id = super::influencer_index(raw);

    let mut out = Vec::new();

    for post in &raw.posts {
        let Some(inf) = by_id.get(post.influencer_id.as_str()) else {
            continue;
        };
        if inf.payout_basis != PayoutBasis::Post {
            continue;
        }
        out.push(PaymentLogEntry {
            payment_log_id: format!("plog_post_{}", post.post_id),
            influencer_id: inf.influencer_id.clone(),
            payment_basis: inf.payout_basis,
            post_id: Some(post.post_id.clone()),
            source: post.platform.clone(),
            invoice_date: post.date,
            payment_amount: post_payout_amount(inf.follower_count, rates),
        });
    }

    let order_based: HashSet<&str> = by_id
        .values()
        .filter(|i| i.payout_basis == PayoutBasis::Order)
        .map(|i| i.influencer_id.as_str())
        .filter(|id| posting.contains(id))
        .collect();

    for rec in &raw.tracking {
        if !rec.attribution_type.is_influenced() {
            continue;
        }
        let Some(inf_id) = rec.influencer_id.as_deref() else {
            continue;
        };
        if !order_based.contains(inf_id) {
            continue;
        }
        out.push(PaymentLogEntry {
            payment_log_id: format!(
                "plog_order_{}_{}_{}",
                rec.user_id,
                rec.product.replace(' ', "_"),
                crate::dates::to_db_string(rec.date)
            ),
            influencer_id: inf_id.to_string(),
            payment_basis: PayoutBasis::Order,
            post_id: post_id_from_source(&rec.source).map(str::to_string),
            source: rec.source.clone(),
            invoice_date: rec.date,
            payment_amount: commission_amount(rec.revenue_or_zero(), rates),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{AttributionType, Influencer, Post, TrackingRecord};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn influencer(id: &str, followers: u64, basis: PayoutBasis) -> Influencer {
        Influencer {
            influencer_id: id.into(),
            name: id.into(),
            category: "Fitness".into(),
            gender: "Male".into(),
            follower_count: followers,
            platform: "YouTube".into(),
            payout_basis: basis,
        }
    }

    fn post(id: &str, inf: &str, brand: Option<&str>) -> Post {
        Post {
            post_id: id.into(),
            influencer_id: inf.into(),
            platform: "YouTube".into(),
            date: date(),
            brand: brand.map(Into::into),
            campaign: None,
            reach: 1000,
            likes: 50,
            comments: 5,
        }
    }

    fn influenced(inf: &str, post: &str, revenue: Option<f64>) -> TrackingRecord {
        TrackingRecord {
            source: format!("trk_{inf}_{post}"),
            campaign: Some("MB_Summer_Shred".into()),
            influencer_id: Some(inf.into()),
            user_id: "user_00001".into(),
            product: "Whey Protein".into(),
            date: date(),
            orders: 1,
            revenue,
            attribution_type: AttributionType::Influenced,
            brand: Some("MuscleBlaze".into()),
        }
    }

    #[test]
    fn progressive_rate_uses_fractional_tiers() {
        let rates = PayoutRates::default();
        // 150k above threshold = half a tier -> 0.05 + 0.5 * 0.01
        assert_eq!(post_payout_amount(650_000, &rates), 35_750.0);
        assert_eq!(post_payout_amount(500_000, &rates), 25_000.0);
        assert_eq!(post_payout_amount(1_100_000, &rates), 77_000.0);
    }

    #[test]
    fn below_threshold_clamps_tiers_to_zero() {
        let rates = PayoutRates::default();
        assert_eq!(post_payout_amount(200_000, &rates), 10_000.0);
    }

    #[test]
    fn commission_is_rounded_to_cents() {
        let rates = PayoutRates::default();
        assert_eq!(commission_amount(1500.0, &rates), 120.0);
        assert_eq!(commission_amount(333.33, &rates), 26.67);
    }

    #[test]
    fn every_post_of_post_basis_influencer_is_paid() {
        let raw = RawData {
            influencers: vec![influencer("inf_001", 650_000, PayoutBasis::Post)],
            posts: vec![
                post("post_001", "inf_001", Some("MuscleBlaze")),
                post("post_002", "inf_001", None),
            ],
            tracking: vec![influenced("inf_001", "post_001", Some(3800.0))],
        };
        let log = build_payment_log(&raw, &PayoutRates::default());
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.payment_amount == 35_750.0));
        assert_eq!(log[0].payment_log_id, "plog_post_post_001");
        assert_eq!(log[1].source, "YouTube");
    }

    #[test]
    fn order_basis_pays_per_influenced_order() {
        let mut organic = influenced("inf_002", "post_001", Some(900.0));
        organic.attribution_type = AttributionType::Organic;
        let raw = RawData {
            influencers: vec![influencer("inf_002", 40_000, PayoutBasis::Order)],
            posts: vec![post("post_001", "inf_002", Some("MuscleBlaze"))],
            tracking: vec![
                influenced("inf_002", "post_001", Some(1500.0)),
                influenced("inf_002", "post_001", None),
                organic,
            ],
        };
        let log = build_payment_log(&raw, &PayoutRates::default());
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].payment_amount, 120.0);
        assert_eq!(log[0].post_id.as_deref(), Some("post_001"));
        assert_eq!(log[0].payment_log_id, "plog_order_user_00001_Whey_Protein_2025-03-01");
        assert_eq!(log[1].payment_amount, 0.0);
    }

    #[test]
    fn influencers_without_posts_are_excluded() {
        let raw = RawData {
            influencers: vec![
                influencer("inf_003", 40_000, PayoutBasis::Order),
                influencer("inf_004", 900_000, PayoutBasis::Post),
            ],
            posts: vec![],
            tracking: vec![influenced("inf_003", "post_009", Some(1500.0))],
        };
        assert!(build_payment_log(&raw, &PayoutRates::default()).is_empty());
    }

    #[test]
    fn malformed_source_yields_no_post_id() {
        let mut rec = influenced("inf_002", "post_001", Some(100.0));
        rec.source = "coupon_SUMMER".into();
        let raw = RawData {
            influencers: vec![influencer("inf_002", 40_000, PayoutBasis::Order)],
            posts: vec![post("post_001", "inf_002", None)],
            tracking: vec![rec],
        };
        let log = build_payment_log(&raw, &PayoutRates::default());
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].post_id, None);
    }
}

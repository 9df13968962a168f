//! Chart-ready breakdowns of a filtered view.
//!
//! Each function returns plain rows; rendering is someone else's job. Groups
//! are accumulated in an [`IndexMap`] and then sorted by amount, ties by label.

use std::cmp::Ordering;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::dates::{week_ending, week_endings};
use crate::filter::FilteredView;
use crate::marts::{EnrichedOrder, InfluencerPerformance};

/// Label used for orders with no platform in platform breakdowns.
pub const ORGANIC_SALES_LABEL: &str = "Organic Sales";

/// A labelled amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    /// Group label.
    pub label: String,
    /// Summed amount.
    pub value: f64,
}

/// A labelled row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    /// Group label.
    pub label: String,
    /// Number of order rows.
    pub count: usize,
}

/// Revenue per product (rows) and platform (columns), zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPlatformMatrix {
    /// Row labels, sorted.
    pub products: Vec<String>,
    /// Column labels, sorted.
    pub platforms: Vec<String>,
    /// `revenue[p][q]` is the revenue of `products[p]` on `platforms[q]`.
    pub revenue: Vec<Vec<f64>>,
}

/// One weekly bucket, labelled by its closing Sunday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekPoint {
    /// Sunday closing the week.
    pub week_ending: NaiveDate,
    /// Order revenue in the week.
    pub revenue: f64,
    /// Payout invoiced in the week.
    pub payout: f64,
    /// `margin × revenue − payout`.
    pub net_profit: f64,
}

/// Averages over the influencers of a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InfluencerSummary {
    /// Influencers with at least one matching order.
    pub active_influencers: usize,
    /// Posts by those influencers.
    pub total_posts: u64,
    /// Mean posts per influencer.
    pub avg_posts: f64,
    /// Mean revenue per influencer.
    pub avg_revenue: f64,
    /// Mean payout per influencer.
    pub avg_payout: f64,
    /// Mean engagement rate.
    pub avg_engagement_rate: f64,
    /// Reach of those influencers.
    pub total_reach: u64,
}

fn by_value_desc(a: &Share, b: &Share) -> Ordering {
    b.value
        .partial_cmp(&a.value)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.label.cmp(&b.label))
}

fn platform_label(o: &EnrichedOrder) -> &str {
    match o.platform.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => ORGANIC_SALES_LABEL,
    }
}

fn revenue_by<'a>(
    view: &FilteredView<'a>,
    key: impl Fn(&'a EnrichedOrder) -> Option<&'a str>,
) -> Vec<Share> {
    let mut groups: IndexMap<&str, f64> = IndexMap::new();
    for o in view.orders.iter().copied() {
        if let Some(k) = key(o) {
            *groups.entry(k).or_default() += o.revenue_generated;
        }
    }
    let mut out: Vec<Share> = groups
        .into_iter()
        .map(|(label, value)| Share {
            label: label.to_string(),
            value,
        })
        .collect();
    out.sort_by(by_value_desc);
    out
}

fn count_by<'a>(
    view: &FilteredView<'a>,
    key: impl Fn(&'a EnrichedOrder) -> Option<&'a str>,
) -> Vec<Count> {
    let mut groups: IndexMap<&str, usize> = IndexMap::new();
    for o in view.orders.iter().copied() {
        if let Some(k) = key(o) {
            *groups.entry(k).or_default() += 1;
        }
    }
    let mut out: Vec<Count> = groups
        .into_iter()
        .map(|(label, count)| Count {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

/// Revenue per brand; orders without a brand are skipped.
pub fn revenue_by_brand(view: &FilteredView<'_>) -> Vec<Share> {
    revenue_by(view, |o| o.brand.as_deref())
}

/// Revenue per product.
pub fn revenue_by_product(view: &FilteredView<'_>) -> Vec<Share> {
    revenue_by(view, |o| Some(o.product.as_str()))
}

/// Revenue per campaign; orders without a campaign are skipped.
pub fn revenue_by_campaign(view: &FilteredView<'_>) -> Vec<Share> {
    revenue_by(view, |o| o.campaign.as_deref())
}

/// Revenue per platform, with unattributed orders under [`ORGANIC_SALES_LABEL`].
pub fn revenue_by_platform(view: &FilteredView<'_>) -> Vec<Share> {
    revenue_by(view, |o| Some(platform_label(o)))
}

/// Order rows per brand.
pub fn orders_by_brand(view: &FilteredView<'_>) -> Vec<Count> {
    count_by(view, |o| o.brand.as_deref())
}

/// Order rows per campaign.
pub fn orders_by_campaign(view: &FilteredView<'_>) -> Vec<Count> {
    count_by(view, |o| o.campaign.as_deref())
}

/// Product × platform revenue grid.
pub fn product_platform_matrix(view: &FilteredView<'_>) -> ProductPlatformMatrix {
    let mut cells: IndexMap<(&str, &str), f64> = IndexMap::new();
    for o in &view.orders {
        *cells.entry((o.product.as_str(), platform_label(o))).or_default() += o.revenue_generated;
    }

    let mut products: Vec<&str> = cells.keys().map(|(p, _)| *p).collect();
    products.sort_unstable();
    products.dedup();
    let mut platforms: Vec<&str> = cells.keys().map(|(_, q)| *q).collect();
    platforms.sort_unstable();
    platforms.dedup();

    let revenue = products
        .iter()
        .map(|p| {
            platforms
                .iter()
                .map(|q| cells.get(&(*p, *q)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    ProductPlatformMatrix {
        products: products.into_iter().map(str::to_string).collect(),
        platforms: platforms.into_iter().map(str::to_string).collect(),
        revenue,
    }
}

/// Weekly revenue, payout and net profit.
///
/// Weeks run Monday to Sunday. Every week between the earliest and latest
/// dated row (orders or payments) is present, empty ones at 0.
pub fn weekly_trend(view: &FilteredView<'_>, margin: f64) -> Vec<WeekPoint> {
    let dates = view
        .orders
        .iter()
        .map(|o| o.order_date)
        .chain(view.payments.iter().map(|p| p.invoice_date));
    let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
        return Vec::new();
    };

    let mut weeks: IndexMap<NaiveDate, (f64, f64)> = week_endings(first, last)
        .into_iter()
        .map(|w| (w, (0.0, 0.0)))
        .collect();
    for o in &view.orders {
        if let Some(slot) = weeks.get_mut(&week_ending(o.order_date)) {
            slot.0 += o.revenue_generated;
        }
    }
    for p in &view.payments {
        if let Some(slot) = weeks.get_mut(&week_ending(p.invoice_date)) {
            slot.1 += p.payment_amount;
        }
    }

    weeks
        .into_iter()
        .map(|(week_ending, (revenue, payout))| WeekPoint {
            week_ending,
            revenue,
            payout,
            net_profit: margin * revenue - payout,
        })
        .collect()
}

/// Up to `n` influencers with positive revenue, highest first.
pub fn top_by_revenue<'a>(view: &FilteredView<'a>, n: usize) -> Vec<&'a InfluencerPerformance> {
    let mut rows: Vec<&InfluencerPerformance> =
        view.performance.iter().copied().filter(|r| r.revenue > 0.0).collect();
    rows.sort_by(|a, b| b.revenue.partial_cmp(&a.revenue).unwrap_or(Ordering::Equal));
    rows.truncate(n);
    rows
}

/// Up to `n` influencers with negative ROI, worst first.
pub fn worst_by_roi<'a>(view: &FilteredView<'a>, n: usize) -> Vec<&'a InfluencerPerformance> {
    let mut rows: Vec<&InfluencerPerformance> =
        view.performance.iter().copied().filter(|r| r.roi < 0.0).collect();
    rows.sort_by(|a, b| a.roi.partial_cmp(&b.roi).unwrap_or(Ordering::Equal));
    rows.truncate(n);
    rows
}

/// Summary statistics over the view's performance rows.
pub fn influencer_summary(view: &FilteredView<'_>) -> InfluencerSummary {
    let rows = &view.performance;
    if rows.is_empty() {
        return InfluencerSummary::default();
    }
    let n = rows.len() as f64;
    let total_posts: u64 = rows.iter().map(|r| r.posts).sum();
    InfluencerSummary {
        active_influencers: rows.len(),
        total_posts,
        avg_posts: total_posts as f64 / n,
        avg_revenue: rows.iter().map(|r| r.revenue).sum::<f64>() / n,
        avg_payout: rows.iter().map(|r| r.payout).sum::<f64>() / n,
        avg_engagement_rate: rows.iter().map(|r| r.engagement_rate).sum::<f64>() / n,
        total_reach: rows.iter().map(|r| r.reach).sum(),
    }
}

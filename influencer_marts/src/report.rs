//! One-shot dashboard report: KPIs plus every breakdown for a selection.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::breakdown::{
    self, Count, InfluencerSummary, ProductPlatformMatrix, Share, WeekPoint,
};
use crate::filter::{self, Selection};
use crate::format::group_south_asian;
use crate::kpi::{self, Kpis};
use crate::marts::{InfluencerPerformance, Marts};

/// Rows shown in each influencer ranking.
pub const RANKING_SIZE: usize = 10;

/// Everything the dashboard shows for one selection, as owned data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// First order date in the selection.
    pub start: NaiveDate,
    /// Last order date in the selection.
    pub end: NaiveDate,
    /// Headline figures.
    pub kpis: Kpis,
    /// Revenue per brand.
    pub revenue_by_brand: Vec<Share>,
    /// Revenue per product.
    pub revenue_by_product: Vec<Share>,
    /// Revenue per campaign.
    pub revenue_by_campaign: Vec<Share>,
    /// Revenue per platform.
    pub revenue_by_platform: Vec<Share>,
    /// Orders per brand.
    pub orders_by_brand: Vec<Count>,
    /// Orders per campaign.
    pub orders_by_campaign: Vec<Count>,
    /// Product × platform revenue.
    pub product_platform: ProductPlatformMatrix,
    /// Weekly revenue, payout and net profit.
    pub weekly: Vec<WeekPoint>,
    /// Highest revenue influencers.
    pub top_by_revenue: Vec<InfluencerPerformance>,
    /// Most negative ROI influencers.
    pub worst_by_roi: Vec<InfluencerPerformance>,
    /// Influencer averages.
    pub influencers: InfluencerSummary,
}

impl Report {
    /// Filter `marts` by `selection` and compute every figure.
    pub fn build(marts: &Marts, selection: &Selection, profit_margin: f64) -> Self {
        let view = filter::apply(marts, selection);
        Self {
            start: selection.start,
            end: selection.end,
            kpis: kpi::compute(&view, profit_margin),
            revenue_by_brand: breakdown::revenue_by_brand(&view),
            revenue_by_product: breakdown::revenue_by_product(&view),
            revenue_by_campaign: breakdown::revenue_by_campaign(&view),
            revenue_by_platform: breakdown::revenue_by_platform(&view),
            orders_by_brand: breakdown::orders_by_brand(&view),
            orders_by_campaign: breakdown::orders_by_campaign(&view),
            product_platform: breakdown::product_platform_matrix(&view),
            weekly: breakdown::weekly_trend(&view, profit_margin),
            top_by_revenue: breakdown::top_by_revenue(&view, RANKING_SIZE)
                .into_iter()
                .cloned()
                .collect(),
            worst_by_roi: breakdown::worst_by_roi(&view, RANKING_SIZE)
                .into_iter()
                .cloned()
                .collect(),
            influencers: breakdown::influencer_summary(&view),
        }
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "-".repeat(title.chars().count()))
}

fn shares(f: &mut fmt::Formatter<'_>, title: &str, rows: &[Share]) -> fmt::Result {
    if rows.is_empty() {
        return Ok(());
    }
    section(f, title)?;
    for s in rows {
        writeln!(f, "{:<28} {:>14}", s.label, group_south_asian(s.value))?;
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = &self.kpis;
        writeln!(f, "Campaign report {} .. {}", self.start, self.end)?;

        section(f, "KPIs")?;
        writeln!(f, "Total revenue          {:>14}", group_south_asian(k.total_revenue))?;
        writeln!(f, "Total payout           {:>14}", group_south_asian(k.total_payout))?;
        writeln!(f, "Net profit             {:>14}", group_south_asian(k.net_profit))?;
        writeln!(f, "Organic revenue        {:>14}", group_south_asian(k.baseline_revenue))?;
        writeln!(f, "Influencer revenue     {:>14}", group_south_asian(k.influencer_driven_revenue))?;
        writeln!(f, "Incremental ROAS       {:>14.2}", k.incremental_roas)?;
        writeln!(f, "ROI                    {:>13.2}%", k.roi)?;
        writeln!(f, "Net profit margin      {:>13.2}%", k.net_profit_margin * 100.0)?;
        writeln!(f, "Campaigns              {:>14}", k.campaign_count)?;
        writeln!(
            f,
            "Orders                 {:>14} ({} influenced, {} organic)",
            k.total_orders, k.influenced_orders, k.organic_orders
        )?;

        shares(f, "Revenue by brand", &self.revenue_by_brand)?;
        shares(f, "Revenue by product", &self.revenue_by_product)?;
        shares(f, "Revenue by campaign", &self.revenue_by_campaign)?;
        shares(f, "Revenue by platform", &self.revenue_by_platform)?;

        if !self.weekly.is_empty() {
            section(f, "Weekly trend (week ending)")?;
            for w in &self.weekly {
                writeln!(
                    f,
                    "{}  revenue {:>12}  payout {:>12}  net {:>12}",
                    w.week_ending,
                    group_south_asian(w.revenue),
                    group_south_asian(w.payout),
                    group_south_asian(w.net_profit)
                )?;
            }
        }

        if !self.top_by_revenue.is_empty() {
            section(f, "Top influencers by revenue")?;
            for r in &self.top_by_revenue {
                writeln!(f, "{:<28} {:>14}", r.influencer, group_south_asian(r.revenue))?;
            }
        }
        if !self.worst_by_roi.is_empty() {
            section(f, "Worst influencers by ROI")?;
            for r in &self.worst_by_roi {
                writeln!(f, "{:<28} {:>13.2}%", r.influencer, r.roi)?;
            }
        }

        let s = &self.influencers;
        section(f, "Influencers")?;
        writeln!(f, "Active                 {:>14}", s.active_influencers)?;
        writeln!(f, "Posts                  {:>14}", s.total_posts)?;
        writeln!(f, "Avg posts              {:>14.1}", s.avg_posts)?;
        writeln!(f, "Avg revenue            {:>14}", group_south_asian(s.avg_revenue))?;
        writeln!(f, "Avg payout             {:>14}", group_south_asian(s.avg_payout))?;
        writeln!(f, "Avg engagement         {:>13.2}%", s.avg_engagement_rate)?;
        write!(f, "Total reach            {:>14}", group_south_asian(s.total_reach as f64))
    }
}

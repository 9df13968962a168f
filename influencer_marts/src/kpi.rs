//! Dashboard KPIs over a filtered view.
//!
//! Revenue figures come from the filtered orders, payout from the filtered
//! payment log. Every ratio is 0 when its denominator is 0.

use std::collections::HashSet;

use serde::Serialize;

use crate::filter::FilteredView;

/// Headline figures for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    /// Sum of order revenue.
    pub total_revenue: f64,
    /// Sum of payment amounts.
    pub total_payout: f64,
    /// `profit_margin × total_revenue − total_payout`.
    pub net_profit: f64,
    /// Revenue of orders not attributed to an influencer.
    pub baseline_revenue: f64,
    /// Revenue of influenced orders.
    pub influencer_driven_revenue: f64,
    /// Influencer-driven revenue per unit of payout.
    pub incremental_roas: f64,
    /// Net profit as a percentage of payout.
    pub roi: f64,
    /// Distinct non-null campaigns among the orders.
    pub campaign_count: usize,
    /// Order rows in the view.
    pub total_orders: usize,
    /// Influenced order rows.
    pub influenced_orders: usize,
    /// Every other order row.
    pub organic_orders: usize,
    /// Net profit as a fraction of revenue.
    pub net_profit_margin: f64,
}

fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

/// Compute KPIs for `view` with the given gross margin (0.45 by default).
pub fn compute(view: &FilteredView<'_>, profit_margin: f64) -> Kpis {
    let mut k = Kpis::default();
    let mut campaigns: HashSet<&str> = HashSet::new();

    for o in &view.orders {
        k.total_revenue += o.revenue_generated;
        if o.attribution_type.is_influenced() {
            k.influencer_driven_revenue += o.revenue_generated;
            k.influenced_orders += 1;
        } else {
            k.baseline_revenue += o.revenue_generated;
            k.organic_orders += 1;
        }
        if let Some(c) = o.campaign.as_deref() {
            campaigns.insert(c);
        }
    }
    k.total_orders = view.orders.len();
    k.campaign_count = campaigns.len();

    k.total_payout = view.payments.iter().map(|p| p.payment_amount).sum();
    k.net_profit = profit_margin * k.total_revenue - k.total_payout;
    k.incremental_roas = ratio_or_zero(k.influencer_driven_revenue, k.total_payout);
    k.roi = ratio_or_zero(k.net_profit * 100.0, k.total_payout);
    k.net_profit_margin = ratio_or_zero(k.net_profit, k.total_revenue);
    k
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::marts::{EnrichedOrder, PaymentLogEntry};
    use crate::raw::{AttributionType, PayoutBasis};

    fn order(revenue: f64, attribution: AttributionType, campaign: Option<&str>) -> EnrichedOrder {
        EnrichedOrder {
            campaign: campaign.map(Into::into),
            influencer_id: None,
            product: "Creatine".into(),
            order_date: NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
            orders: 1,
            revenue_generated: revenue,
            cost_of_goods: 0.0,
            gross_profit: 0.0,
            attribution_type: attribution,
            post_id: None,
            platform: None,
            post_date: None,
            reach: None,
            likes: None,
            comments: None,
            brand: Some("MuscleBlaze".into()),
            name: None,
            category: None,
            gender: None,
            follower_count: None,
            payout_type: None,
        }
    }

    fn payment(amount: f64) -> PaymentLogEntry {
        PaymentLogEntry {
            payment_log_id: "plog".into(),
            influencer_id: "inf_001".into(),
            payment_basis: PayoutBasis::Post,
            post_id: None,
            source: "Instagram".into(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
            payment_amount: amount,
        }
    }

    #[test]
    fn reconciles_revenue_and_profit() {
        let orders = [
            order(2000.0, AttributionType::Influenced, Some("MB_Summer_Shred")),
            order(1000.0, AttributionType::Influenced, Some("MB_Summer_Shred")),
            order(1000.0, AttributionType::Organic, None),
            order(500.0, AttributionType::Other("Affiliate".into()), Some("Aff")),
        ];
        let payments = [payment(600.0)];
        let view = FilteredView {
            orders: orders.iter().collect(),
            payments: payments.iter().collect(),
            ..Default::default()
        };
        let k = compute(&view, 0.45);

        assert_eq!(k.total_revenue, 4500.0);
        assert_eq!(k.influencer_driven_revenue, 3000.0);
        assert_eq!(k.baseline_revenue, 1500.0);
        assert_eq!(k.net_profit, 0.45 * 4500.0 - 600.0);
        assert_eq!(k.incremental_roas, 5.0);
        assert_eq!(k.roi, k.net_profit * 100.0 / 600.0);
        assert_eq!(k.campaign_count, 2);
        assert_eq!((k.total_orders, k.influenced_orders, k.organic_orders), (4, 2, 2));
        assert_eq!(k.net_profit_margin, k.net_profit / 4500.0);
    }

    #[test]
    fn empty_view_has_zero_ratios() {
        let k = compute(&FilteredView::default(), 0.45);
        assert_eq!(k, Kpis::default());
    }

    #[test]
    fn zero_payout_keeps_ratios_finite() {
        let orders = [order(1000.0, AttributionType::Influenced, None)];
        let view = FilteredView {
            orders: orders.iter().collect(),
            ..Default::default()
        };
        let k = compute(&view, 0.45);
        assert_eq!(k.incremental_roas, 0.0);
        assert_eq!(k.roi, 0.0);
        assert_eq!(k.net_profit, 450.0);
    }
}

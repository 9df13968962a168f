//! SQL renditions of the three marts for downstream SQL consumers.
//!
//! [`rebuild_views`] drops and recreates `payments_log`, `enriched_orders`
//! and `influencer_performance` in one `BEGIN IMMEDIATE` transaction, with the
//! configured rates embedded as literals. The views follow the same rules as
//! [`crate::marts`]:
//! - tracking sources yield a post id only when they start with `trk_` and
//!   contain `post_`;
//! - influencers without a single post are never paid;
//! - cost of goods truncates, payouts round to cents, ROAS/ROI to whole numbers;
//!   cents are rounded as `ROUND(x * 100, 0) / 100.0` (half away from zero,
//!   matching [`crate::marts::payments::round_to`]);
//! - dates are cut to their first ten characters (`YYYY-MM-DD`).
//!
//! Readers that query a view mid-rebuild are blocked by the write lock rather
//! than observing a half-built set.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use serde::Serialize;

use crate::config::PayoutRates;

/// The view names, in dependency order.
pub const VIEW_NAMES: [&str; 3] = ["payments_log", "enriched_orders", "influencer_performance"];

/// Post id expression for tracking alias `t`.
const POST_ID_SQL: &str = "CASE WHEN t.source LIKE 'trk\\_%' ESCAPE '\\' AND INSTR(t.source, 'post_') > 0 \
     THEN SUBSTR(t.source, INSTR(t.source, 'post_')) ELSE NULL END";

fn payments_log_sql(rates: &PayoutRates) -> String {
    let PayoutRates {
        commission_rate,
        segmentation_threshold,
        base_multiplier,
        progressive_increment,
        tier_size,
        ..
    } = rates;
    format!(
        "CREATE VIEW payments_log AS
SELECT
    'plog_post_' || p.post_id AS payment_log_id,
    p.influencer_id AS influencer_id,
    i.payout_basis AS payment_basis,
    p.post_id AS post_id,
    p.platform AS source,
    SUBSTR(p.date, 1, 10) AS invoice_date,
    ROUND(i.follower_count * ({base_multiplier}
        + MAX(0, CAST(i.follower_count - {segmentation_threshold} AS REAL) / {tier_size}) * {progressive_increment})
        * 100, 0) / 100.0 AS payment_amount
FROM raw_posts AS p
JOIN raw_influencers AS i ON p.influencer_id = i.influencer_id
WHERE i.payout_basis = 'Post'
UNION ALL
SELECT
    'plog_order_' || t.user_id || '_' || REPLACE(t.product, ' ', '_') || '_' || SUBSTR(t.date, 1, 10),
    t.influencer_id,
    i.payout_basis,
    {POST_ID_SQL},
    t.source,
    SUBSTR(t.date, 1, 10),
    ROUND(COALESCE(t.revenue, 0) * {commission_rate} * 100, 0) / 100.0
FROM raw_tracking_data AS t
JOIN raw_influencers AS i ON t.influencer_id = i.influencer_id
WHERE t.attribution_type = 'Influenced'
  AND i.payout_basis = 'Order'
  AND EXISTS (SELECT 1 FROM raw_posts AS x WHERE x.influencer_id = i.influencer_id);"
    )
}

fn enriched_orders_sql(rates: &PayoutRates) -> String {
    let cogs = rates.cost_of_goods_ratio;
    format!(
        "CREATE VIEW enriched_orders AS
SELECT
    t.campaign AS campaign,
    t.influencer_id AS influencer_id,
    t.product AS product,
    SUBSTR(t.date, 1, 10) AS order_date,
    t.orders AS orders,
    COALESCE(t.revenue, 0) AS revenue_generated,
    CAST(COALESCE(t.revenue, 0) * {cogs} AS INTEGER) AS cost_of_goods,
    COALESCE(t.revenue, 0) - CAST(COALESCE(t.revenue, 0) * {cogs} AS INTEGER) AS gross_profit,
    t.attribution_type AS attribution_type,
    {POST_ID_SQL} AS post_id,
    p.platform AS platform,
    SUBSTR(p.date, 1, 10) AS post_date,
    p.reach AS reach,
    p.likes AS likes,
    p.comments AS comments,
    t.brand AS brand,
    i.name AS name,
    i.category AS category,
    i.gender AS gender,
    i.follower_count AS follower_count,
    i.payout_basis AS payout_type
FROM raw_tracking_data AS t
LEFT JOIN raw_posts AS p
    ON t.influencer_id = p.influencer_id AND ({POST_ID_SQL}) = p.post_id
LEFT JOIN raw_influencers AS i ON t.influencer_id = i.influencer_id
ORDER BY order_date ASC, t.id ASC;"
    )
}

fn influencer_performance_sql(rates: &PayoutRates) -> String {
    let cogs = rates.cost_of_goods_ratio;
    format!(
        "CREATE VIEW influencer_performance AS
SELECT
    i.influencer_id AS influencer_id,
    i.name AS influencer,
    i.payout_basis AS payout_type,
    COALESCE(pa.posts, 0) AS posts,
    COALESCE(pa.reach, 0) AS reach,
    COALESCE(pa.likes, 0) AS likes,
    COALESCE(pa.comments, 0) AS comments,
    COALESCE(ROUND((pa.likes + pa.comments) * 100.0 / NULLIF(pa.reach, 0) * 100, 0) / 100.0, 0) AS engagement_rate,
    COALESCE(ta.orders, 0) AS orders,
    COALESCE(ta.revenue, 0) AS revenue,
    COALESCE(pl.payout, 0) AS payout,
    COALESCE(ta.revenue, 0) * (1 - {cogs}) AS gross_profit,
    COALESCE(ta.revenue, 0) * (1 - {cogs}) - COALESCE(pl.payout, 0) AS net_profit,
    CASE WHEN COALESCE(pl.payout, 0) = 0 THEN 0
         ELSE ROUND(COALESCE(ta.revenue, 0) * 1.0 / pl.payout, 0) END AS roas,
    CASE WHEN COALESCE(pl.payout, 0) = 0 THEN 0
         ELSE ROUND((COALESCE(ta.revenue, 0) * (1 - {cogs}) - pl.payout) * 100.0 / pl.payout, 0) END AS roi
FROM raw_influencers AS i
LEFT JOIN (
    SELECT influencer_id, COUNT(post_id) AS posts, SUM(reach) AS reach,
           SUM(likes) AS likes, SUM(comments) AS comments
    FROM raw_posts GROUP BY influencer_id
) AS pa ON i.influencer_id = pa.influencer_id
LEFT JOIN (
    SELECT influencer_id, SUM(orders) AS orders, SUM(COALESCE(revenue, 0)) AS revenue
    FROM raw_tracking_data WHERE attribution_type = 'Influenced' GROUP BY influencer_id
) AS ta ON i.influencer_id = ta.influencer_id
LEFT JOIN (
    SELECT influencer_id, SUM(payment_amount) AS payout
    FROM payments_log GROUP BY influencer_id
) AS pl ON i.influencer_id = pl.influencer_id
ORDER BY i.influencer_id;"
    )
}

/// Drop and recreate the three views with `rates` embedded.
pub fn rebuild_views(conn: &mut SqliteConnection, rates: &PayoutRates) -> anyhow::Result<()> {
    rates.validate()?;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        // dependents first
        for name in VIEW_NAMES.iter().rev() {
            conn.batch_execute(&format!("DROP VIEW IF EXISTS {name};"))?;
        }
        conn.batch_execute(&payments_log_sql(rates))?;
        conn.batch_execute(&enriched_orders_sql(rates))?;
        conn.batch_execute(&influencer_performance_sql(rates))?;
        Ok(())
    })?;
    tracing::info!(views = VIEW_NAMES.len(), "rebuilt reporting views");
    Ok(())
}

/// Row counts of the three views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewCounts {
    /// Rows in `payments_log`.
    pub payments_log: i64,
    /// Rows in `enriched_orders`.
    pub enriched_orders: i64,
    /// Rows in `influencer_performance`.
    pub influencer_performance: i64,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

fn count_rows(conn: &mut SqliteConnection, view: &str) -> anyhow::Result<i64> {
    let row: RowCount = sql_query(format!("SELECT COUNT(*) AS n FROM {view}")).get_result(conn)?;
    Ok(row.n)
}

/// Count the rows of each view. Fails if the views have not been built.
pub fn view_row_counts(conn: &mut SqliteConnection) -> anyhow::Result<ViewCounts> {
    Ok(ViewCounts {
        payments_log: count_rows(conn, "payments_log")?,
        enriched_orders: count_rows(conn, "enriched_orders")?,
        influencer_performance: count_rows(conn, "influencer_performance")?,
    })
}

mod common;

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use influencer_marts::config::PayoutRates;
use influencer_marts::db::views::{self, ViewCounts};
use influencer_marts::import::{ImportOptions, import_snapshot, load_snapshot_str};
use influencer_marts::marts::Marts;
use influencer_marts::raw::RawData;

#[derive(QueryableByName, Debug)]
struct PerformanceRow {
    #[diesel(sql_type = Text)]
    influencer_id: String,
    #[diesel(sql_type = Double)]
    revenue: f64,
    #[diesel(sql_type = Double)]
    payout: f64,
    #[diesel(sql_type = Double)]
    engagement_rate: f64,
}

#[derive(QueryableByName)]
struct OrderRow {
    #[diesel(sql_type = Text)]
    order_date: String,
    #[diesel(sql_type = Nullable<Text>)]
    post_id: Option<String>,
    #[diesel(sql_type = Double)]
    cost_of_goods: f64,
}

#[derive(QueryableByName)]
struct Payment {
    #[diesel(sql_type = Text)]
    payment_log_id: String,
    #[diesel(sql_type = Double)]
    payment_amount: f64,
}

#[derive(QueryableByName)]
struct Total {
    #[diesel(sql_type = Double)]
    total: f64,
}

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn views_have_one_row_per_fact() {
    let (_db, mut conn) = common::seeded_db();
    views::rebuild_views(&mut conn, &PayoutRates::default()).unwrap();

    let counts = views::view_row_counts(&mut conn).unwrap();
    assert_eq!(
        counts,
        ViewCounts {
            payments_log: 4,
            enriched_orders: 6,
            influencer_performance: 3,
        }
    );
}

#[test]
fn views_agree_with_in_memory_marts() {
    let (_db, mut conn) = common::seeded_db();
    let rates = PayoutRates::default();
    views::rebuild_views(&mut conn, &rates).unwrap();
    let marts = Marts::build(&RawData::load(&mut conn).unwrap(), &rates);

    let paid: Total = sql_query("SELECT SUM(payment_amount) AS total FROM payments_log")
        .get_result(&mut conn)
        .unwrap();
    assert!(close(paid.total, marts.total_payout()));

    let rows: Vec<PerformanceRow> = sql_query(
        "SELECT influencer_id, revenue, payout, engagement_rate FROM influencer_performance",
    )
    .load(&mut conn)
    .unwrap();
    assert_eq!(rows.len(), marts.performance.len());
    for (sql, mem) in rows.iter().zip(&marts.performance) {
        assert_eq!(sql.influencer_id, mem.influencer_id);
        assert!(close(sql.revenue, mem.revenue), "{sql:?}");
        assert!(close(sql.payout, mem.payout), "{sql:?}");
        assert!(close(sql.engagement_rate, mem.engagement_rate), "{sql:?}");
    }

    let orders: Vec<OrderRow> =
        sql_query("SELECT order_date, post_id, cost_of_goods FROM enriched_orders")
            .load(&mut conn)
            .unwrap();
    let dates: Vec<String> = marts.orders.iter().map(|o| o.order_date.to_string()).collect();
    assert_eq!(orders.iter().map(|o| o.order_date.clone()).collect::<Vec<_>>(), dates);
    for (sql, mem) in orders.iter().zip(&marts.orders) {
        assert_eq!(sql.post_id, mem.post_id);
        assert!(close(sql.cost_of_goods, mem.cost_of_goods));
    }
}

#[test]
fn half_cent_post_fees_round_like_the_marts() {
    let (_db, mut conn) = common::setup_db();
    // 504500 * 0.05015 = 25300.675 and 519500 * 0.05065 = 26312.675
    let snapshot = load_snapshot_str(
        r#"{
          "influencers": [
            {"influencer_id": "inf_101", "name": "Rohan Das", "category": "Fitness", "gender": "Male",
             "follower_count": 504500, "platform": "YouTube", "payout_basis": "Post"},
            {"influencer_id": "inf_102", "name": "Meera Iyer", "category": "Yoga", "gender": "Female",
             "follower_count": 519500, "platform": "YouTube", "payout_basis": "Post"}
          ],
          "posts": [
            {"post_id": "post_101", "influencer_id": "inf_101", "platform": "YouTube", "date": "2025-04-01",
             "brand": "MuscleBlaze", "campaign": "MB_Summer_Shred", "reach": 1000, "likes": 10, "comments": 1},
            {"post_id": "post_102", "influencer_id": "inf_102", "platform": "YouTube", "date": "2025-04-02",
             "brand": "MuscleBlaze", "campaign": "MB_Summer_Shred", "reach": 1000, "likes": 10, "comments": 1}
          ]
        }"#,
    )
    .unwrap();
    import_snapshot(&mut conn, &snapshot, ImportOptions::default()).unwrap();

    let rates = PayoutRates::default();
    views::rebuild_views(&mut conn, &rates).unwrap();
    let marts = Marts::build(&RawData::load(&mut conn).unwrap(), &rates);

    let rows: Vec<Payment> =
        sql_query("SELECT payment_log_id, payment_amount FROM payments_log ORDER BY payment_log_id")
            .load(&mut conn)
            .unwrap();
    assert_eq!(rows.len(), 2);
    for (sql, mem) in rows.iter().zip(&marts.payments) {
        assert_eq!(sql.payment_log_id, mem.payment_log_id);
        assert_eq!(sql.payment_amount, mem.payment_amount, "{}", sql.payment_log_id);
    }
    assert_eq!(marts.payments[0].payment_amount, 25_300.68);
    assert_eq!(marts.payments[1].payment_amount, 26_312.68);
}

#[test]
fn organic_orders_have_no_post_id() {
    let (_db, mut conn) = common::seeded_db();
    views::rebuild_views(&mut conn, &PayoutRates::default()).unwrap();

    let c: Count = sql_query(
        "SELECT COUNT(*) AS n FROM enriched_orders WHERE attribution_type = 'Organic' AND post_id IS NULL",
    )
    .get_result(&mut conn)
    .unwrap();
    assert_eq!(c.n, 2);
}

#[test]
fn rebuilding_replaces_views_with_new_rates() {
    let (_db, mut conn) = common::seeded_db();
    views::rebuild_views(&mut conn, &PayoutRates::default()).unwrap();

    let doubled = PayoutRates {
        commission_rate: 0.16,
        ..PayoutRates::default()
    };
    views::rebuild_views(&mut conn, &doubled).unwrap();

    let c: Total = sql_query(
        "SELECT SUM(payment_amount) AS total FROM payments_log WHERE payment_basis = 'Order'",
    )
    .get_result(&mut conn)
    .unwrap();
    // 1500 and 1201 at 16%
    assert!(close(c.total, 240.0 + 192.16));
    assert_eq!(views::view_row_counts(&mut conn).unwrap().payments_log, 4);
}

#[test]
fn counting_before_rebuild_fails() {
    let (_db, mut conn) = common::seeded_db();
    assert!(views::view_row_counts(&mut conn).is_err());
}

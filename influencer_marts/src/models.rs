//! Diesel models mapping to the raw tables.
//!
//! These types mirror the tables created by the embedded migrations and
//! declared in [`crate::schema`]:
//! - [`crate::schema::raw_influencers`]: one row per influencer, payout basis fixed at creation
//! - [`crate::schema::raw_posts`]: one row per post, sponsored or not
//! - [`crate::schema::raw_tracking_data`]: one row per order, influenced or organic
//!
//! Rows keep the storage representation (dates as `YYYY-MM-DD` text, enums as
//! text). Conversion into typed domain records lives in [`crate::raw`].
//!
//! The same structs double as the JSON import format (see [`crate::import`]),
//! so field names follow the generator's column names.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::*;

/// A row in [`crate::schema::raw_influencers`].
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize,
)]
#[diesel(table_name = raw_influencers, check_for_backend(diesel::sqlite::Sqlite))]
pub struct InfluencerRow {
    /// Unique influencer identifier (e.g., "inf_001").
    pub influencer_id: String,
    /// Display name.
    pub name: String,
    /// Content category (e.g., "Fitness").
    pub category: String,
    /// Gender label as supplied by the source.
    pub gender: String,
    /// Follower count; never negative.
    pub follower_count: i64,
    /// Home platform of the influencer.
    pub platform: String,
    /// "Post" or "Order".
    pub payout_basis: String,
}

/// A row in [`crate::schema::raw_posts`].
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize,
)]
#[diesel(table_name = raw_posts, check_for_backend(diesel::sqlite::Sqlite))]
pub struct PostRow {
    /// Unique post identifier (e.g., "post_042").
    pub post_id: String,
    /// Owning influencer.
    pub influencer_id: String,
    /// Platform the post was published on.
    pub platform: String,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    /// Sponsoring brand; NULL for unsponsored posts.
    pub brand: Option<String>,
    /// Campaign name; NULL for unsponsored posts.
    pub campaign: Option<String>,
    /// Accounts reached.
    pub reach: i64,
    /// Like count.
    pub likes: i64,
    /// Comment count.
    pub comments: i64,
}

/// A row in [`crate::schema::raw_tracking_data`] as read back from the store.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = raw_tracking_data, check_for_backend(diesel::sqlite::Sqlite))]
pub struct TrackingRow {
    /// Database primary key (insertion order).
    pub id: i32,
    /// Tracking source, `trk_<influencer>_<post>` or `organic`.
    pub source: String,
    /// Campaign; NULL for organic orders.
    pub campaign: Option<String>,
    /// Attributed influencer; NULL for organic orders.
    pub influencer_id: Option<String>,
    /// Purchasing user.
    pub user_id: String,
    /// Product name.
    pub product: String,
    /// Order date, `YYYY-MM-DD`.
    pub date: String,
    /// Order count for this record (1 in generated data).
    pub orders: i64,
    /// Order revenue; NULL is treated as 0 downstream.
    pub revenue: Option<f64>,
    /// "Influenced" or "Organic".
    pub attribution_type: String,
    /// Brand of the purchased product.
    pub brand: Option<String>,
}

/// Insertable form of [`TrackingRow`]; the primary key is assigned by SQLite.
#[derive(Debug, Clone, PartialEq, Insertable, Serialize, Deserialize)]
#[diesel(table_name = raw_tracking_data)]
pub struct NewTrackingRow {
    /// Tracking source, `trk_<influencer>_<post>` or `organic`.
    pub source: String,
    /// Campaign; None for organic orders.
    pub campaign: Option<String>,
    /// Attributed influencer; None for organic orders.
    pub influencer_id: Option<String>,
    /// Purchasing user.
    pub user_id: String,
    /// Product name.
    pub product: String,
    /// Order date, `YYYY-MM-DD`.
    pub date: String,
    /// Order count for this record.
    #[serde(default = "one")]
    pub orders: i64,
    /// Order revenue.
    pub revenue: Option<f64>,
    /// "Influenced" or "Organic".
    pub attribution_type: String,
    /// Brand of the purchased product.
    pub brand: Option<String>,
}

fn one() -> i64 {
    1
}

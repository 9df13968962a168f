//! Typed, immutable snapshot of the three raw relations.
//!
//! [`RawData::load`] reads `raw_influencers`, `raw_posts` and
//! `raw_tracking_data` and converts every row into a domain record. Failure to
//! read any relation is fatal: the marts are never built from a partial
//! snapshot.
//!
//! The client-supplied payouts file is deliberately not part of this
//! snapshot. It lacks `post_id` and `invoice_date`; the payment log is rebuilt
//! from posts and tracking records instead.

use std::fmt;

use anyhow::Context;
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dates::parse_date;
use crate::error::MartError;
use crate::models::{InfluencerRow, PostRow, TrackingRow};

/// How an influencer is compensated. Fixed when the influencer is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutBasis {
    /// Flat fee per post, scaled by follower count.
    Post,
    /// Commission on each influenced order.
    Order,
}

impl PayoutBasis {
    /// Basis implied by the follower segmentation rule: `Post` at or above the threshold.
    pub fn for_followers(follower_count: u64, threshold: u64) -> Self {
        if follower_count >= threshold {
            PayoutBasis::Post
        } else {
            PayoutBasis::Order
        }
    }

    /// Storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutBasis::Post => "Post",
            PayoutBasis::Order => "Order",
        }
    }

    /// Parse the storage string.
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Post" => Some(PayoutBasis::Post),
            "Order" => Some(PayoutBasis::Order),
            _ => None,
        }
    }
}

impl fmt::Display for PayoutBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a sale is credited to influencer activity.
///
/// Labels other than the two known ones are kept verbatim in
/// [`AttributionType::Other`] so that no order silently disappears.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributionType {
    /// Credited to an influencer post.
    Influenced,
    /// Not attributed to any campaign.
    Organic,
    /// Any other label found in the source data.
    Other(String),
}

impl AttributionType {
    /// Parse the storage string; never fails.
    pub fn from_db(s: &str) -> Self {
        match s {
            "Influenced" => AttributionType::Influenced,
            "Organic" => AttributionType::Organic,
            other => AttributionType::Other(other.to_string()),
        }
    }

    /// Storage string.
    pub fn as_str(&self) -> &str {
        match self {
            AttributionType::Influenced => "Influenced",
            AttributionType::Organic => "Organic",
            AttributionType::Other(s) => s,
        }
    }

    /// True for [`AttributionType::Influenced`].
    pub fn is_influenced(&self) -> bool {
        matches!(self, AttributionType::Influenced)
    }
}

/// An influencer.
#[derive(Debug, Clone, PartialEq)]
pub struct Influencer {
    /// Unique identifier.
    pub influencer_id: String,
    /// Display name.
    pub name: String,
    /// Content category.
    pub category: String,
    /// Gender label.
    pub gender: String,
    /// Follower count.
    pub follower_count: u64,
    /// Home platform.
    pub platform: String,
    /// Compensation rule.
    pub payout_basis: PayoutBasis,
}

/// A post, sponsored or not.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Unique identifier.
    pub post_id: String,
    /// Owning influencer.
    pub influencer_id: String,
    /// Publishing platform.
    pub platform: String,
    /// Publication date.
    pub date: NaiveDate,
    /// Sponsoring brand, if any.
    pub brand: Option<String>,
    /// Campaign, if any.
    pub campaign: Option<String>,
    /// Accounts reached.
    pub reach: u64,
    /// Likes.
    pub likes: u64,
    /// Comments.
    pub comments: u64,
}

/// An order as recorded by the tracking system.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRecord {
    /// Tracking source (`trk_<influencer>_<post>` or `organic`).
    pub source: String,
    /// Campaign, if influenced.
    pub campaign: Option<String>,
    /// Attributed influencer, if influenced.
    pub influencer_id: Option<String>,
    /// Purchasing user.
    pub user_id: String,
    /// Product name.
    pub product: String,
    /// Order date.
    pub date: NaiveDate,
    /// Order count carried by this record.
    pub orders: i64,
    /// Revenue; `None` is treated as 0 by every mart.
    pub revenue: Option<f64>,
    /// Attribution label.
    pub attribution_type: AttributionType,
    /// Brand of the purchased product.
    pub brand: Option<String>,
}

impl TrackingRecord {
    /// Revenue with missing values coerced to 0.
    pub fn revenue_or_zero(&self) -> f64 {
        self.revenue.unwrap_or(0.0)
    }
}

/// Immutable snapshot of the raw relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawData {
    /// All influencers.
    pub influencers: Vec<Influencer>,
    /// All posts.
    pub posts: Vec<Post>,
    /// All tracking records, in insertion order.
    pub tracking: Vec<TrackingRecord>,
}

fn non_negative(relation: &'static str, column: &'static str, v: i64) -> Result<u64, MartError> {
    u64::try_from(v).map_err(|_| MartError::NegativeCount {
        relation,
        column,
        value: v,
    })
}

fn date_of(relation: &'static str, s: &str) -> Result<NaiveDate, MartError> {
    parse_date(s).ok_or_else(|| MartError::BadDate {
        relation,
        value: s.to_string(),
    })
}

impl TryFrom<InfluencerRow> for Influencer {
    type Error = MartError;

    fn try_from(r: InfluencerRow) -> Result<Self, Self::Error> {
        let payout_basis =
            PayoutBasis::from_db(&r.payout_basis).ok_or_else(|| MartError::UnknownPayoutBasis {
                influencer_id: r.influencer_id.clone(),
                value: r.payout_basis.clone(),
            })?;
        Ok(Influencer {
            follower_count: non_negative("raw_influencers", "follower_count", r.follower_count)?,
            influencer_id: r.influencer_id,
            name: r.name,
            category: r.category,
            gender: r.gender,
            platform: r.platform,
            payout_basis,
        })
    }
}

impl TryFrom<PostRow> for Post {
    type Error = MartError;

    fn try_from(r: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            date: date_of("raw_posts", &r.date)?,
            reach: non_negative("raw_posts", "reach", r.reach)?,
            likes: non_negative("raw_posts", "likes", r.likes)?,
            comments: non_negative("raw_posts", "comments", r.comments)?,
            post_id: r.post_id,
            influencer_id: r.influencer_id,
            platform: r.platform,
            brand: r.brand,
            campaign: r.campaign,
        })
    }
}

impl TryFrom<TrackingRow> for TrackingRecord {
    type Error = MartError;

    fn try_from(r: TrackingRow) -> Result<Self, Self::Error> {
        Ok(TrackingRecord {
            date: date_of("raw_tracking_data", &r.date)?,
            attribution_type: AttributionType::from_db(&r.attribution_type),
            source: r.source,
            campaign: r.campaign,
            influencer_id: r.influencer_id,
            user_id: r.user_id,
            product: r.product,
            orders: r.orders,
            revenue: r.revenue,
            brand: r.brand,
        })
    }
}

impl RawData {
    /// Read all three raw relations from the store.
    ///
    /// Errors:
    /// - Any relation missing or unreadable ([`MartError::MissingRelation`] in the chain)
    /// - Any row failing conversion (bad date, unknown payout basis, negative count)
    pub fn load(conn: &mut SqliteConnection) -> anyhow::Result<Self> {
        use crate::schema::{raw_influencers, raw_posts, raw_tracking_data};

        let influencers = raw_influencers::table
            .order(raw_influencers::influencer_id.asc())
            .select(InfluencerRow::as_select())
            .load(conn)
            .context(MartError::MissingRelation("raw_influencers"))?;
        let posts = raw_posts::table
            .order(raw_posts::post_id.asc())
            .select(PostRow::as_select())
            .load(conn)
            .context(MartError::MissingRelation("raw_posts"))?;
        let tracking = raw_tracking_data::table
            .order(raw_tracking_data::id.asc())
            .select(TrackingRow::as_select())
            .load(conn)
            .context(MartError::MissingRelation("raw_tracking_data"))?;

        let raw = Self::from_rows(influencers, posts, tracking)?;
        tracing::info!(
            influencers = raw.influencers.len(),
            posts = raw.posts.len(),
            tracking = raw.tracking.len(),
            "loaded raw relations"
        );
        Ok(raw)
    }

    /// Convert storage rows into a snapshot.
    pub fn from_rows(
        influencers: Vec<InfluencerRow>,
        posts: Vec<PostRow>,
        tracking: Vec<TrackingRow>,
    ) -> Result<Self, MartError> {
        let raw = RawData {
            influencers: influencers
                .into_iter()
                .map(Influencer::try_from)
                .collect::<Result<_, MartError>>()?,
            posts: posts.into_iter().map(Post::try_from).collect::<Result<_, MartError>>()?,
            tracking: tracking
                .into_iter()
                .map(TrackingRecord::try_from)
                .collect::<Result<_, MartError>>()?,
        };
        Ok(raw)
    }

    /// Influencers whose stored basis disagrees with the follower threshold.
    ///
    /// The stored basis stays authoritative; this only reports.
    pub fn segmentation_mismatches(&self, threshold: u64) -> Vec<&Influencer> {
        self.influencers
            .iter()
            .filter(|i| PayoutBasis::for_followers(i.follower_count, threshold) != i.payout_basis)
            .collect()
    }

    pub(crate) fn warn_on_segmentation_mismatch(&self, threshold: u64) {
        for i in self.segmentation_mismatches(threshold) {
            tracing::warn!(
                influencer_id = %i.influencer_id,
                follower_count = i.follower_count,
                payout_basis = %i.payout_basis,
                "payout basis disagrees with follower segmentation"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inf_row(id: &str, followers: i64, basis: &str) -> InfluencerRow {
        InfluencerRow {
            influencer_id: id.into(),
            name: "Priya Sharma".into(),
            category: "Fitness".into(),
            gender: "Female".into(),
            follower_count: followers,
            platform: "Instagram".into(),
            payout_basis: basis.into(),
        }
    }

    #[test]
    fn segmentation_is_total() {
        assert_eq!(PayoutBasis::for_followers(500_000, 500_000), PayoutBasis::Post);
        assert_eq!(PayoutBasis::for_followers(499_999, 500_000), PayoutBasis::Order);
        assert_eq!(PayoutBasis::for_followers(0, 500_000), PayoutBasis::Order);
    }

    #[test]
    fn unknown_basis_is_rejected() {
        let err = Influencer::try_from(inf_row("inf_001", 10, "Hybrid")).unwrap_err();
        assert!(matches!(err, MartError::UnknownPayoutBasis { .. }));
    }

    #[test]
    fn negative_followers_are_rejected() {
        let err = Influencer::try_from(inf_row("inf_001", -1, "Order")).unwrap_err();
        assert!(matches!(err, MartError::NegativeCount { column: "follower_count", .. }));
    }

    #[test]
    fn unexpected_attribution_is_kept() {
        let a = AttributionType::from_db("Affiliate");
        assert_eq!(a, AttributionType::Other("Affiliate".into()));
        assert_eq!(a.as_str(), "Affiliate");
        assert!(!a.is_influenced());
    }

    #[test]
    fn mismatches_are_reported_not_rewritten() {
        let raw = RawData::from_rows(
            vec![inf_row("inf_001", 600_000, "Order"), inf_row("inf_002", 600_000, "Post")],
            vec![],
            vec![],
        )
        .unwrap();
        let bad = raw.segmentation_mismatches(500_000);
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].influencer_id, "inf_001");
        assert_eq!(raw.influencers[0].payout_basis, PayoutBasis::Order);
    }

    #[test]
    fn bad_post_date_names_relation() {
        let row = PostRow {
            post_id: "post_001".into(),
            influencer_id: "inf_001".into(),
            platform: "Instagram".into(),
            date: "yesterday".into(),
            brand: None,
            campaign: None,
            reach: 1,
            likes: 1,
            comments: 1,
        };
        let err = Post::try_from(row).unwrap_err();
        assert_eq!(err.to_string(), "raw_posts: bad date 'yesterday'");
    }
}

//! Loading a raw-data snapshot into the store.
//!
//! ## What this does
//! - Reads a [`RawSnapshot`] (JSON) holding the three raw relations.
//! - **Validates** every row before touching the store: known payout basis,
//!   parseable dates, non-negative counts.
//! - **Replaces** the raw tables with the snapshot: existing rows are deleted,
//!   then the snapshot rows are inserted. Importing the same file twice leaves
//!   the store as after the first import.
//!
//! ## Transactions & consistency
//! Delete and insert run inside a single **`BEGIN IMMEDIATE`** transaction via
//! `SqliteConnection::immediate_transaction`, so readers see either the old or
//! the new raw data.
//!
//! ## Dry-run
//! When [`ImportOptions::dry_run`] is `true`, the returned [`ImportSummary`]
//! describes what would change and nothing is written.

mod repo;
mod summary;

use anyhow::Context;
use diesel::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::dates::parse_date;
use crate::error::MartError;
use crate::models::{InfluencerRow, NewTrackingRow, PostRow};
use crate::raw::{Influencer, Post};

pub use summary::{ImportSummary, TableChange};

/// Raw tables in write order.
pub const RAW_TABLES: [&str; 3] = ["raw_influencers", "raw_posts", "raw_tracking_data"];

/// The three raw relations as produced by the upstream generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSnapshot {
    /// Influencer rows.
    #[serde(default)]
    pub influencers: Vec<InfluencerRow>,
    /// Post rows.
    #[serde(default)]
    pub posts: Vec<PostRow>,
    /// Tracking rows; ids are assigned on insert.
    #[serde(default)]
    pub tracking: Vec<NewTrackingRow>,
}

impl RawSnapshot {
    /// Reject rows the marts could not load back.
    pub fn validate(&self) -> Result<(), MartError> {
        for row in &self.influencers {
            Influencer::try_from(row.clone())?;
        }
        for row in &self.posts {
            Post::try_from(row.clone())?;
        }
        for row in &self.tracking {
            if parse_date(&row.date).is_none() {
                return Err(MartError::BadDate {
                    relation: "raw_tracking_data",
                    value: row.date.clone(),
                });
            }
            if row.orders < 0 {
                return Err(MartError::NegativeCount {
                    relation: "raw_tracking_data",
                    column: "orders",
                    value: row.orders,
                });
            }
        }
        Ok(())
    }

    fn row_counts(&self) -> [usize; 3] {
        [self.influencers.len(), self.posts.len(), self.tracking.len()]
    }
}

/// Parse a snapshot from a JSON string.
pub fn load_snapshot_str(json: &str) -> anyhow::Result<RawSnapshot> {
    serde_json::from_str(json).context("failed to parse raw snapshot JSON")
}

/// Read and parse a snapshot file.
pub fn load_snapshot_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<RawSnapshot> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read snapshot file {}", path.as_ref().display()))?;
    load_snapshot_str(&text)
}

/// Options for [`import_snapshot`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// If true, compute the summary only and write nothing.
    pub dry_run: bool,
}

/// Replace the raw tables with `snapshot`.
///
/// Errors:
/// - A row fails validation (nothing is written)
/// - Duplicate primary keys within the snapshot (the transaction rolls back)
pub fn import_snapshot(
    conn: &mut SqliteConnection,
    snapshot: &RawSnapshot,
    opt: ImportOptions,
) -> anyhow::Result<ImportSummary> {
    snapshot.validate()?;

    let summary = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let existing = repo::count_rows(conn)?;
        let incoming = snapshot.row_counts();
        let tables = RAW_TABLES
            .into_iter()
            .zip(existing.into_iter().zip(incoming))
            .map(|(table, (deleted, inserted))| TableChange {
                table,
                deleted: usize::try_from(deleted).unwrap_or(0),
                inserted,
            })
            .collect();

        if !opt.dry_run {
            repo::clear_raw_tables(conn)?;
            for row in &snapshot.influencers {
                repo::insert_influencer(conn, row)
                    .with_context(|| format!("insert influencer {}", row.influencer_id))?;
            }
            for row in &snapshot.posts {
                repo::insert_post(conn, row)
                    .with_context(|| format!("insert post {}", row.post_id))?;
            }
            for row in &snapshot.tracking {
                repo::insert_tracking(conn, row)?;
            }
        }

        Ok(ImportSummary {
            dry_run: opt.dry_run,
            tables,
        })
    })?;

    tracing::info!(
        dry_run = summary.dry_run,
        deleted = summary.deleted(),
        inserted = summary.inserted(),
        "raw import finished"
    );
    Ok(summary)
}

//! Row-level writes for the raw tables.
use diesel::prelude::*;
use diesel::{RunQueryDsl, SqliteConnection, insert_into};

use crate::models::{InfluencerRow, NewTrackingRow, PostRow};
use crate::schema::{raw_influencers, raw_posts, raw_tracking_data};

/// Current row counts of the raw tables, in [`super::RAW_TABLES`] order.
pub fn count_rows(conn: &mut SqliteConnection) -> anyhow::Result<[i64; 3]> {
    Ok([
        raw_influencers::table.count().get_result(conn)?,
        raw_posts::table.count().get_result(conn)?,
        raw_tracking_data::table.count().get_result(conn)?,
    ])
}

/// Delete every raw row. Tracking first, influencers last.
pub fn clear_raw_tables(conn: &mut SqliteConnection) -> anyhow::Result<usize> {
    let mut n = diesel::delete(raw_tracking_data::table).execute(conn)?;
    n += diesel::delete(raw_posts::table).execute(conn)?;
    n += diesel::delete(raw_influencers::table).execute(conn)?;
    Ok(n)
}

/// insert influencer
pub fn insert_influencer(conn: &mut SqliteConnection, row: &InfluencerRow) -> anyhow::Result<usize> {
    let n = insert_into(raw_influencers::table).values(row).execute(conn)?;
    Ok(n)
}

/// insert post
pub fn insert_post(conn: &mut SqliteConnection, row: &PostRow) -> anyhow::Result<usize> {
    let n = insert_into(raw_posts::table).values(row).execute(conn)?;
    Ok(n)
}

/// insert tracking record; SQLite assigns the id
pub fn insert_tracking(conn: &mut SqliteConnection, row: &NewTrackingRow) -> anyhow::Result<usize> {
    let n = insert_into(raw_tracking_data::table).values(row).execute(conn)?;
    Ok(n)
}

#![allow(dead_code)]

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use influencer_marts::db::{connection, migrate};
use influencer_marts::import::{ImportOptions, RawSnapshot, import_snapshot, load_snapshot_str};
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_all(&path).expect("migrations");

    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal");

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

/// Small but complete dataset:
/// - inf_001: 650k followers, Post basis, two posts (one unsponsored)
/// - inf_002: 42k followers, Order basis, one post, two influenced orders
/// - inf_003: 30k followers, Order basis, no posts but one influenced order
/// - two organic orders, one without revenue
pub const FIXTURE: &str = r#"{
  "influencers": [
    {"influencer_id": "inf_001", "name": "Priya Sharma", "category": "Fitness", "gender": "Female",
     "follower_count": 650000, "platform": "YouTube", "payout_basis": "Post"},
    {"influencer_id": "inf_002", "name": "Kabir Mehta", "category": "Bodybuilding", "gender": "Male",
     "follower_count": 42000, "platform": "Instagram", "payout_basis": "Order"},
    {"influencer_id": "inf_003", "name": "Ananya Rao", "category": "Nutrition", "gender": "Female",
     "follower_count": 30000, "platform": "Instagram", "payout_basis": "Order"}
  ],
  "posts": [
    {"post_id": "post_001", "influencer_id": "inf_001", "platform": "YouTube", "date": "2025-03-03",
     "brand": "MuscleBlaze", "campaign": "MB_Summer_Shred", "reach": 200000, "likes": 9000, "comments": 1000},
    {"post_id": "post_002", "influencer_id": "inf_001", "platform": "YouTube", "date": "2025-03-12",
     "brand": null, "campaign": null, "reach": 50000, "likes": 1500, "comments": 100},
    {"post_id": "post_003", "influencer_id": "inf_002", "platform": "Instagram", "date": "2025-03-05",
     "brand": "HKVitals", "campaign": "HKV_Glow", "reach": 10000, "likes": 450, "comments": 50}
  ],
  "tracking": [
    {"source": "trk_inf_001_post_001", "campaign": "MB_Summer_Shred", "influencer_id": "inf_001",
     "user_id": "user_00001", "product": "Whey Protein", "date": "2025-03-04", "revenue": 3800.0,
     "attribution_type": "Influenced", "brand": "MuscleBlaze"},
    {"source": "trk_inf_002_post_003", "campaign": "HKV_Glow", "influencer_id": "inf_002",
     "user_id": "user_00002", "product": "Biotin Gummies", "date": "2025-03-06", "revenue": 1500.0,
     "attribution_type": "Influenced", "brand": "HKVitals"},
    {"source": "trk_inf_002_post_003", "campaign": "HKV_Glow", "influencer_id": "inf_002",
     "user_id": "user_00003", "product": "Biotin Gummies", "date": "2025-03-10", "revenue": 1201.0,
     "attribution_type": "Influenced", "brand": "HKVitals"},
    {"source": "trk_inf_003_post_999", "campaign": "HKV_Glow", "influencer_id": "inf_003",
     "user_id": "user_00004", "product": "Fish Oil", "date": "2025-03-07", "revenue": 900.0,
     "attribution_type": "Influenced", "brand": "HKVitals"},
    {"source": "organic", "campaign": null, "influencer_id": null,
     "user_id": "user_00005", "product": "Whey Protein", "date": "2025-03-01", "revenue": 2500.0,
     "attribution_type": "Organic", "brand": "MuscleBlaze"},
    {"source": "organic", "campaign": null, "influencer_id": null,
     "user_id": "user_00006", "product": "Fish Oil", "date": "2025-03-15", "revenue": null,
     "attribution_type": "Organic", "brand": "HKVitals"}
  ]
}"#;

pub fn fixture() -> RawSnapshot {
    load_snapshot_str(FIXTURE).expect("fixture parses")
}

/// Fresh store holding [`FIXTURE`].
pub fn seeded_db() -> (TestDb, SqliteConnection) {
    let (db, mut conn) = setup_db();
    import_snapshot(&mut conn, &fixture(), ImportOptions { dry_run: false }).expect("seed");
    (db, conn)
}

//! Store plumbing for the raw relations and the SQL marts.
//!
//! - [`connection::connect_sqlite`] opens the store with WAL journaling,
//!   enforced foreign keys and a 5s busy timeout.
//! - [`migrate::run_all`] creates or upgrades the raw tables from the embedded
//!   migrations; plain file paths and `sqlite:` URLs both work.
//! - [`views::rebuild_views`] (re)creates the three reporting views.
//!
//! Example:
//! ```no_run
//! use influencer_marts::db::{connection, migrate, views};
//! use influencer_marts::config::PayoutRates;
//!
//! let db_path = std::env::temp_dir().join("influencer_marts_example.db");
//! let url = db_path.to_string_lossy();
//! migrate::run_all(&url).expect("migrations");
//!
//! let mut conn = connection::connect_sqlite(&url).expect("connect");
//! views::rebuild_views(&mut conn, &PayoutRates::default()).expect("views");
//! ```

pub mod connection;
pub mod migrate;
pub mod views;

//! Reporting marts for influencer campaigns.
//!
//! Raw influencers, posts and order-tracking records live in SQLite
//! ([`db`], [`schema`], [`models`]). A typed snapshot of them ([`raw::RawData`])
//! feeds three pure builders ([`marts`]): the payment log, enriched orders and
//! per-influencer performance. [`filter`], [`kpi`] and [`breakdown`] narrow the
//! marts to a user selection and summarize it; [`report`] bundles the result.
//!
//! ```no_run
//! use influencer_marts::{cache::MartCache, config::PayoutRates, db, filter, kpi};
//!
//! let mut conn = db::connection::connect_sqlite("data.db")?;
//! let rates = PayoutRates::default();
//! let cache = MartCache::new();
//! let marts = cache.refresh(&mut conn, &rates)?;
//!
//! let selection = filter::Selection::everything(&marts);
//! let view = filter::apply(&marts, &selection);
//! let kpis = kpi::compute(&view, rates.profit_margin_factor);
//! println!("net profit: {}", kpis.net_profit);
//! # Ok::<(), anyhow::Error>(())
//! ```

#![deny(missing_docs)]

pub mod breakdown;
pub mod cache;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod filter;
pub mod format;
pub mod import;
pub mod kpi;
pub mod marts;
pub mod models;
pub mod raw;
pub mod report;
#[allow(missing_docs)]
pub mod schema;
pub mod source;

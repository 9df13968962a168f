//! Lock-free, read-mostly holder for the current marts.
//!
//! Readers call [`MartCache::snapshot`], which loads an `Arc<Marts>` with no
//! locking contention. Writers call [`MartCache::refresh`] (or
//! [`MartCache::replace`]) to build a complete new set and swap it in
//! atomically. A reader therefore sees either the old or the new marts, never
//! a mix.
//!
//! Implementation notes:
//! - Uses `arc-swap` for atomic pointer swaps + cheap reads (no RwLock).
//! - Starts out empty; until the first refresh every mart has zero rows.

use std::sync::Arc;

use arc_swap::ArcSwap;
use diesel::SqliteConnection;

use crate::config::PayoutRates;
use crate::marts::Marts;
use crate::raw::RawData;

/// Holder of the most recently built [`Marts`].
#[derive(Debug)]
pub struct MartCache {
    current: ArcSwap<Marts>,
}

impl Default for MartCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MartCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Marts::default()),
        }
    }

    /// Cache seeded with prebuilt marts.
    pub fn with_marts(marts: Marts) -> Self {
        Self {
            current: ArcSwap::from_pointee(marts),
        }
    }

    /// Current marts. Cheap: one atomic load.
    pub fn snapshot(&self) -> Arc<Marts> {
        self.current.load_full()
    }

    /// Swap in prebuilt marts and return the previous ones.
    pub fn replace(&self, marts: Marts) -> Arc<Marts> {
        self.current.swap(Arc::new(marts))
    }

    /// Reload the raw relations, rebuild every mart and swap them in.
    ///
    /// Invalid `rates` are rejected before the store is read. On any error
    /// the previous snapshot stays in place.
    pub fn refresh(&self, conn: &mut SqliteConnection, rates: &PayoutRates) -> anyhow::Result<Arc<Marts>> {
        rates.validate()?;
        let raw = RawData::load(conn)?;
        let fresh = Arc::new(Marts::build(&raw, rates));
        self.current.store(Arc::clone(&fresh));
        tracing::info!(
            orders = fresh.orders.len(),
            influencers = fresh.performance.len(),
            "mart cache refreshed"
        );
        Ok(fresh)
    }
}

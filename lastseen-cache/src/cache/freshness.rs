//! Fresh/stale lifecycle of a cache snapshot.

use lastseen_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The two externally observable states of the cache.
///
/// `ingest` always moves the cache to `Fresh`. `clear` moves it to `Stale`.
/// `Fresh` decays to `Stale` on its own once the TTL has elapsed; there is
/// no timer, the check happens whenever the state is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// Elapsed time since the last ingest is within the TTL.
    Fresh,
    /// Never ingested, cleared, or the TTL has elapsed.
    #[default]
    Stale,
}

impl CacheState {
    /// Evaluate the state of a snapshot refreshed at `refreshed_at`.
    pub fn evaluate(refreshed_at: Option<Timestamp>, now: Timestamp, ttl: Duration) -> Self {
        match age_at(refreshed_at, now) {
            Some(age) if age <= ttl => Self::Fresh,
            _ => Self::Stale,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Time elapsed since `refreshed_at`, or `None` if never refreshed.
///
/// A refresh time in the future (clock stepped backwards) counts as age zero.
pub fn age_at(refreshed_at: Option<Timestamp>, now: Timestamp) -> Option<Duration> {
    refreshed_at.map(|at| (now - at).to_std().unwrap_or(Duration::ZERO))
}

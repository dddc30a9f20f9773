//! Introspection types: per-ingest diagnostics and cache statistics.

use lastseen_core::Timestamp;
use serde::Serialize;
use std::time::Duration;

/// What one ingest call did with its input.
///
/// Ingest never fails, so this report is the only place dropped and
/// malformed records show up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Events handed to ingest.
    pub received: usize,
    /// Events whose kind is not the tracked kind.
    pub untracked: usize,
    /// Tracked events with no resolvable resource id.
    pub missing_id: usize,
    /// Tracked events whose timestamp did not parse. These still count
    /// toward `retained` when they are the only record for their id.
    pub malformed_timestamp: usize,
    /// Records discarded because another record for the same id won.
    pub superseded: usize,
    /// Entries in the resulting snapshot.
    pub retained: usize,
}

impl IngestReport {
    /// Events dropped before the merge (wrong kind or no id).
    pub fn dropped(&self) -> usize {
        self.untracked + self.missing_id
    }
}

/// Read-only snapshot of cache state for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entry count, irrespective of expiry.
    pub size: usize,
    /// When the current snapshot was ingested.
    pub last_refreshed: Option<Timestamp>,
    pub is_expired: bool,
    /// Time since `last_refreshed`.
    pub age: Option<Duration>,
    pub ttl: Duration,
    /// Diagnostics from the ingest that produced the current snapshot.
    pub last_ingest: IngestReport,
}

impl CacheStats {
    /// Time left before the snapshot goes stale, zero if already stale.
    pub fn remaining(&self) -> Duration {
        match self.age {
            Some(age) if !self.is_expired => self.ttl.saturating_sub(age),
            _ => Duration::ZERO,
        }
    }
}

//! The access-recency cache.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use lastseen_core::{
    AccessRecord, ActivityEvent, LastseenResult, RecencyConfig, ResourceId, Timestamp,
};

use super::extract::RecordExtractor;
use super::freshness::CacheState;
use super::snapshot::Snapshot;
use super::stats::{CacheStats, IngestReport};
use crate::clock::{Clock, SystemClock};

/// In-memory "when was this resource last accessed?" store.
///
/// Holds the result of exactly one ingest at a time. Queries return data only
/// while the snapshot is fresh (`now - last_refreshed <= ttl`); once stale,
/// every query behaves as though the cache were empty, while [`size`] and
/// [`is_empty`] keep describing what is held in memory.
///
/// The cache is meant to be constructed once by whatever owns the UI or
/// service context and shared behind an `Arc`. Ingest is expected to be
/// driven by a single writer; reads may come from anywhere.
///
/// [`size`]: AccessRecencyCache::size
/// [`is_empty`]: AccessRecencyCache::is_empty
#[derive(Debug)]
pub struct AccessRecencyCache<C: Clock = SystemClock> {
    /// Entries and refresh time live together so they are swapped as a unit.
    snapshot: RwLock<Arc<Snapshot>>,
    extractor: RecordExtractor,
    ttl: Duration,
    clock: C,
}

impl AccessRecencyCache<SystemClock> {
    /// Create a cache on the system clock.
    pub fn new(config: &RecencyConfig) -> LastseenResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Create a cache with the default configuration (5 minute TTL).
    pub fn with_defaults() -> Self {
        Self::build(&RecencyConfig::default(), SystemClock)
    }
}

impl<C: Clock> AccessRecencyCache<C> {
    /// Create a cache reading time from `clock`.
    pub fn with_clock(config: &RecencyConfig, clock: C) -> LastseenResult<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: &RecencyConfig, clock: C) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            extractor: RecordExtractor::from_config(config),
            ttl: config.ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn extractor(&self) -> &RecordExtractor {
        &self.extractor
    }

    // ------------------------------------------------------------------
    // Snapshot access
    // ------------------------------------------------------------------

    fn current(&self) -> Arc<Snapshot> {
        // Writers only ever store a fully built snapshot, so a poisoned
        // lock still guards a consistent value.
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn replace(&self, next: Snapshot) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }

    /// The current snapshot if it is fresh at this instant.
    fn fresh(&self) -> Option<Arc<Snapshot>> {
        let snapshot = self.current();
        snapshot
            .state(self.clock.now(), self.ttl)
            .is_fresh()
            .then_some(snapshot)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Replace the cache contents with what `events` says.
    ///
    /// All prior entries are discarded. Events of other kinds, events with no
    /// resolvable resource id, and losing duplicates are dropped silently;
    /// the counts are available from [`last_ingest_report`].
    ///
    /// [`last_ingest_report`]: AccessRecencyCache::last_ingest_report
    pub fn ingest(&self, events: &[ActivityEvent]) {
        let snapshot = Snapshot::build(events, &self.extractor, self.clock.now());
        let report = snapshot.report();

        tracing::debug!(
            received = report.received,
            untracked = report.untracked,
            missing_id = report.missing_id,
            malformed_timestamp = report.malformed_timestamp,
            superseded = report.superseded,
            retained = report.retained,
            "Ingested activity batch"
        );

        self.replace(snapshot);
    }

    /// Drop all entries and forget the last refresh. The cache is stale
    /// until the next ingest.
    pub fn clear(&self) {
        self.replace(Snapshot::empty());
    }

    // ------------------------------------------------------------------
    // Queries (empty when stale)
    // ------------------------------------------------------------------

    /// The record for one resource, or `None` if unknown or stale.
    pub fn get_one(&self, resource_id: &str) -> Option<AccessRecord> {
        self.fresh()?.get(resource_id).cloned()
    }

    /// One entry per requested id, `None` for ids with no record.
    ///
    /// Returns an empty map when the cache is stale.
    pub fn get_many<I, S>(&self, resource_ids: I) -> HashMap<ResourceId, Option<AccessRecord>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(snapshot) = self.fresh() else {
            return HashMap::new();
        };

        resource_ids
            .into_iter()
            .map(|id| {
                let id = id.as_ref();
                (id.to_string(), snapshot.get(id).cloned())
            })
            .collect()
    }

    /// The last access time of one resource.
    pub fn get_last_access_time(&self, resource_id: &str) -> Option<String> {
        self.get_one(resource_id).map(|record| record.last_access_time)
    }

    /// Last access times for several resources, shaped like [`get_many`].
    ///
    /// [`get_many`]: AccessRecencyCache::get_many
    pub fn get_last_access_times<I, S>(&self, resource_ids: I) -> HashMap<ResourceId, Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.get_many(resource_ids)
            .into_iter()
            .map(|(id, record)| (id, record.map(|r| r.last_access_time)))
            .collect()
    }

    /// Every record, in no particular order.
    pub fn get_all(&self) -> Vec<AccessRecord> {
        self.fresh()
            .map(|snapshot| snapshot.entries().values().cloned().collect())
            .unwrap_or_default()
    }

    /// Up to `limit` records, most recently accessed first.
    ///
    /// Records with unreadable timestamps sort last; ties break on resource
    /// id so the order is stable.
    pub fn recent(&self, limit: usize) -> Vec<AccessRecord> {
        let mut records: Vec<(Option<Timestamp>, AccessRecord)> = self
            .get_all()
            .into_iter()
            .map(|record| (record.accessed_at(), record))
            .collect();

        records.sort_by(|(a_at, a), (b_at, b)| {
            b_at.cmp(a_at)
                .then_with(|| a.resource_id.cmp(&b.resource_id))
        });

        records
            .into_iter()
            .take(limit)
            .map(|(_, record)| record)
            .collect()
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn state(&self) -> CacheState {
        self.current().state(self.clock.now(), self.ttl)
    }

    /// True when never ingested, cleared, or older than the TTL.
    pub fn is_expired(&self) -> bool {
        self.state().is_stale()
    }

    /// True when no entries are held, regardless of expiry.
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Entry count, regardless of expiry.
    pub fn size(&self) -> usize {
        self.current().len()
    }

    pub fn last_refreshed(&self) -> Option<Timestamp> {
        self.current().refreshed_at()
    }

    /// Diagnostics from the ingest that produced the current contents.
    pub fn last_ingest_report(&self) -> IngestReport {
        self.current().report()
    }

    pub fn stats(&self) -> CacheStats {
        let snapshot = self.current();
        let now = self.clock.now();

        CacheStats {
            size: snapshot.len(),
            last_refreshed: snapshot.refreshed_at(),
            is_expired: snapshot.state(now, self.ttl).is_stale(),
            age: snapshot.age(now),
            ttl: self.ttl,
            last_ingest: snapshot.report(),
        }
    }
}

impl Default for AccessRecencyCache<SystemClock> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use lastseen_core::{ConfigError, LastseenError};
    use serde_json::json;

    fn viewed(id: &str, at: &str) -> ActivityEvent {
        ActivityEvent::new("video_viewed", at).with_context(json!({ "video_id": id }))
    }

    fn cache_at_t0() -> (AccessRecencyCache<ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        let config = RecencyConfig::default().with_ttl(Duration::from_secs(300));
        let cache = AccessRecencyCache::with_clock(&config, clock.clone()).expect("valid config");
        (cache, clock)
    }

    fn scenario() -> Vec<ActivityEvent> {
        vec![
            viewed("v1", "2024-01-01T00:00:00Z"),
            viewed("v1", "2024-01-01T01:00:00Z"),
            viewed("v2", "2024-01-01T00:30:00Z"),
        ]
    }

    #[test]
    fn test_new_cache_is_stale_and_empty() {
        let (cache, _) = cache_at_t0();
        assert!(cache.is_expired());
        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
        assert!(cache.last_refreshed().is_none());
        assert!(cache.get_one("v1").is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RecencyConfig::default().with_ttl(Duration::ZERO);
        let err = AccessRecencyCache::new(&config).unwrap_err();
        assert!(matches!(err, LastseenError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_scenario_most_recent_wins() {
        let (cache, _) = cache_at_t0();
        cache.ingest(&scenario());

        assert_eq!(
            cache.get_last_access_time("v1").as_deref(),
            Some("2024-01-01T01:00:00Z")
        );
        assert_eq!(
            cache.get_last_access_time("v2").as_deref(),
            Some("2024-01-01T00:30:00Z")
        );
        assert_eq!(cache.size(), 2);
        assert_eq!(cache.state(), CacheState::Fresh);
    }

    #[test]
    fn test_ingest_replaces_previous_snapshot() {
        let (cache, _) = cache_at_t0();
        cache.ingest(&scenario());
        cache.ingest(&[viewed("v3", "2024-01-01T02:00:00Z")]);

        assert!(cache.get_one("v1").is_none());
        assert!(cache.get_one("v2").is_none());
        assert!(cache.get_one("v3").is_some());
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_later_ingest_with_older_time_still_replaces() {
        let (cache, _) = cache_at_t0();
        cache.ingest(&[viewed("v1", "2024-01-01T05:00:00Z")]);
        cache.ingest(&[viewed("v1", "2024-01-01T01:00:00Z")]);

        assert_eq!(
            cache.get_last_access_time("v1").as_deref(),
            Some("2024-01-01T01:00:00Z")
        );
    }

    #[test]
    fn test_expiry_hides_entries_but_keeps_size() {
        let (cache, clock) = cache_at_t0();
        cache.ingest(&scenario());

        clock.advance(Duration::from_secs(300));
        assert!(!cache.is_expired());
        assert!(cache.get_one("v1").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(cache.is_expired());
        assert!(cache.get_one("v1").is_none());
        assert!(cache.get_many(["v1", "v2"]).is_empty());
        assert!(cache.get_last_access_times(["v1"]).is_empty());
        assert!(cache.get_all().is_empty());
        assert!(cache.recent(10).is_empty());
        assert_eq!(cache.size(), 2);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_ingest_after_expiry_is_fresh_again() {
        let (cache, clock) = cache_at_t0();
        cache.ingest(&scenario());
        clock.advance(Duration::from_secs(600));
        assert!(cache.is_expired());

        cache.ingest(&scenario());
        assert!(!cache.is_expired());
        assert_eq!(cache.last_refreshed(), Some(clock.now()));
    }

    #[test]
    fn test_clear_expires_immediately() {
        let (cache, _) = cache_at_t0();
        cache.ingest(&scenario());
        cache.clear();

        assert!(cache.is_expired());
        assert!(cache.is_empty());
        assert!(cache.last_refreshed().is_none());
        assert_eq!(cache.stats().age, None);
    }

    #[test]
    fn test_get_many_preserves_requested_ids() {
        let (cache, _) = cache_at_t0();
        cache.ingest(&scenario());

        let many = cache.get_many(["v1", "unknown", "v1"]);
        assert_eq!(many.len(), 2);
        assert!(many["v1"].is_some());
        assert!(many.contains_key("unknown"));
        assert!(many["unknown"].is_none());
        assert!(!many.contains_key("v2"));
    }

    #[test]
    fn test_batch_matches_point_queries() {
        let (cache, _) = cache_at_t0();
        cache.ingest(&scenario());

        let ids = ["v1", "v2", "v9"];
        let many = cache.get_many(ids);
        let times = cache.get_last_access_times(ids);
        for id in ids {
            assert_eq!(many[id], cache.get_one(id));
            assert_eq!(times[id], cache.get_last_access_time(id));
        }
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let (cache, _) = cache_at_t0();
        cache.ingest(&[
            viewed("old", "2024-01-01T00:00:00Z"),
            viewed("broken", "not a time"),
            viewed("new", "2024-01-01T03:00:00Z"),
            viewed("mid", "2024-01-01T02:00:00Z"),
        ]);

        let ids: Vec<_> = cache
            .recent(10)
            .into_iter()
            .map(|r| r.resource_id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old", "broken"]);

        assert_eq!(cache.recent(2).len(), 2);
    }

    #[test]
    fn test_stats_snapshot() {
        let (cache, clock) = cache_at_t0();
        let refreshed = clock.now();
        cache.ingest(&[
            viewed("v1", "2024-01-01T00:00:00Z"),
            ActivityEvent::new("video_viewed", "2024-01-01T00:00:00Z"),
        ]);
        clock.advance(Duration::from_secs(42));

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.last_refreshed, Some(refreshed));
        assert!(!stats.is_expired);
        assert_eq!(stats.age, Some(Duration::from_secs(42)));
        assert_eq!(stats.ttl, Duration::from_secs(300));
        assert_eq!(stats.last_ingest.missing_id, 1);
        assert_eq!(cache.last_ingest_report(), stats.last_ingest);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(AccessRecencyCache::with_defaults());
        cache.ingest(&scenario());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_last_access_time("v1"))
            })
            .collect();

        for reader in readers {
            assert_eq!(
                reader.join().expect("reader thread").as_deref(),
                Some("2024-01-01T01:00:00Z")
            );
        }
    }
}

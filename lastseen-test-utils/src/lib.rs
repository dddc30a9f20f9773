//! lastseen Test Utilities
//!
//! Shared test infrastructure for the lastseen workspace:
//! - Event fixtures for common scenarios
//! - Proptest generators for activity batches
//! - A deterministic clock and cache constructor
//! - Tracing setup that writes through the test harness

// Re-export core and cache types for convenience
pub use lastseen_cache::{
    AccessRecencyCache, CacheState, CacheStats, Clock, IngestReport, InMemoryActivityFeed,
    ManualClock, RecencyRefresher, RecordExtractor,
};
pub use lastseen_core::{AccessRecord, ActivityEvent, RecencyConfig, Timestamp};

use chrono::{TimeZone, Utc};
use std::sync::Once;
use std::time::Duration;

/// Activity kind the default configuration tracks.
pub const TRACKED_KIND: &str = "video_viewed";

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; defaults to `lastseen_cache=debug`. Safe to call from
/// every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lastseen_cache=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// CLOCK AND CACHE
// ============================================================================

/// The fixed instant test clocks start at: 2024-01-02T00:00:00Z.
pub fn test_epoch() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
        .single()
        .expect("valid fixed epoch")
}

/// A cache on a manual clock frozen at [`test_epoch`], plus a handle to
/// that clock.
pub fn manual_cache(ttl: Duration) -> (AccessRecencyCache<ManualClock>, ManualClock) {
    let clock = ManualClock::new(test_epoch());
    let config = RecencyConfig::default().with_ttl(ttl);
    let cache = AccessRecencyCache::with_clock(&config, clock.clone())
        .expect("test config should be valid");
    (cache, clock)
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Hand-built events for scenario tests.

    use super::*;
    use serde_json::json;

    /// A tracked access of `resource_id` at `at`, id in the primary field.
    pub fn viewed(resource_id: &str, at: &str) -> ActivityEvent {
        ActivityEvent::new(TRACKED_KIND, at).with_context(json!({ "video_id": resource_id }))
    }

    /// A tracked access whose id only appears under the nested fallback path.
    pub fn viewed_nested(resource_id: &str, at: &str) -> ActivityEvent {
        ActivityEvent::new(TRACKED_KIND, at)
            .with_context(json!({ "video": { "id": resource_id } }))
    }

    /// A tracked access with a title and playback position.
    pub fn viewed_titled(resource_id: &str, at: &str, title: &str, position: f64) -> ActivityEvent {
        ActivityEvent::new(TRACKED_KIND, at).with_context(json!({
            "video_id": resource_id,
            "title": title,
            "position": position,
        }))
    }

    /// A tracked event naming no resource.
    pub fn viewed_without_id(at: &str) -> ActivityEvent {
        ActivityEvent::new(TRACKED_KIND, at).with_context(json!({ "title": "orphan" }))
    }

    /// An event of some other kind that mentions a resource.
    pub fn untracked(resource_id: &str, at: &str) -> ActivityEvent {
        ActivityEvent::new("video_liked", at).with_context(json!({ "video_id": resource_id }))
    }

    /// Two accesses of `v1` and one of `v2`; `v1` was last seen at 01:00.
    pub fn two_video_batch() -> Vec<ActivityEvent> {
        vec![
            viewed("v1", "2024-01-01T00:00:00Z"),
            viewed("v1", "2024-01-01T01:00:00Z"),
            viewed("v2", "2024-01-01T00:30:00Z"),
        ]
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for activity batches.

    use super::*;
    use chrono::SecondsFormat;
    use proptest::prelude::*;
    use serde_json::json;

    /// A small resource id alphabet so batches contain duplicates.
    pub fn arb_resource_id() -> impl Strategy<Value = String> {
        (0u8..12).prop_map(|n| format!("v{n}"))
    }

    /// A timestamp within 2024, as UTC seconds.
    pub fn arb_access_time() -> impl Strategy<Value = Timestamp> {
        (0i64..366 * 86_400).prop_map(|offset| {
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid base")
                + chrono::Duration::seconds(offset)
        })
    }

    /// An RFC 3339 rendering of [`arb_access_time`], sometimes with an offset.
    pub fn arb_access_time_text() -> impl Strategy<Value = (Timestamp, String)> {
        (arb_access_time(), prop::bool::ANY).prop_map(|(at, shifted)| {
            let text = if shifted {
                at.with_timezone(&chrono::FixedOffset::east_opt(2 * 3600).expect("valid offset"))
                    .to_rfc3339_opts(SecondsFormat::Secs, false)
            } else {
                at.to_rfc3339_opts(SecondsFormat::Secs, true)
            };
            (at, text)
        })
    }

    /// A well-formed tracked access, id in the primary or fallback field.
    pub fn arb_tracked_event() -> impl Strategy<Value = ActivityEvent> {
        (arb_resource_id(), arb_access_time_text(), prop::bool::ANY).prop_map(
            |(id, (_, text), nested)| {
                let context = if nested {
                    json!({ "video": { "id": id } })
                } else {
                    json!({ "video_id": id })
                };
                ActivityEvent::new(TRACKED_KIND, text).with_context(context)
            },
        )
    }

    /// Noise the cache must ignore: other kinds or tracked events with no id.
    pub fn arb_ignored_event() -> impl Strategy<Value = ActivityEvent> {
        (arb_resource_id(), arb_access_time_text(), prop::bool::ANY).prop_map(
            |(id, (_, text), other_kind)| {
                if other_kind {
                    ActivityEvent::new("video_liked", text).with_context(json!({ "video_id": id }))
                } else {
                    ActivityEvent::new(TRACKED_KIND, text).with_context(json!({ "title": id }))
                }
            },
        )
    }

    /// A batch mixing tracked events with ignorable noise.
    pub fn arb_batch(max_len: usize) -> impl Strategy<Value = Vec<ActivityEvent>> {
        prop::collection::vec(
            prop_oneof![4 => arb_tracked_event(), 1 => arb_ignored_event()],
            0..max_len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_cache_starts_at_epoch() {
        let (cache, clock) = manual_cache(Duration::from_secs(60));
        assert_eq!(clock.now(), test_epoch());
        assert_eq!(cache.ttl(), Duration::from_secs(60));
        assert!(cache.is_expired());
    }

    #[test]
    fn test_fixtures_resolve_as_expected() {
        init_test_tracing();
        let (cache, _) = manual_cache(Duration::from_secs(60));
        cache.ingest(&[
            fixtures::viewed("a", "2024-01-01T00:00:00Z"),
            fixtures::viewed_nested("b", "2024-01-01T00:00:00Z"),
            fixtures::viewed_without_id("2024-01-01T00:00:00Z"),
            fixtures::untracked("c", "2024-01-01T00:00:00Z"),
        ]);

        let report = cache.last_ingest_report();
        assert_eq!(report.retained, 2);
        assert_eq!(report.missing_id, 1);
        assert_eq!(report.untracked, 1);
    }
}

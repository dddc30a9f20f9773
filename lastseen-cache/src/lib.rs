//! lastseen Cache - Access Recency
//!
//! Answers "when was resource X last accessed?" from the most recent batch
//! of activity-log events, with a single TTL governing the whole batch.
//!
//! - [`AccessRecencyCache`]: snapshot-replacement store with point and batch
//!   queries
//! - [`format_absolute`] / [`format_relative`]: display helpers for access
//!   times
//! - [`ActivityFeed`] / [`RecencyRefresher`]: pulling batches from a
//!   paginated activity-log source

pub mod cache;
pub mod clock;
pub mod feed;
pub mod format;
pub mod refresh;

pub use cache::{
    AccessRecencyCache, CacheState, CacheStats, Extraction, IngestReport, RecordExtractor,
    Snapshot,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use feed::{
    collect_activity, ActivityFeed, ActivityPage, ActivityPageRequest, InMemoryActivityFeed,
};
pub use format::{format_absolute, format_relative, format_relative_at, INVALID_DATE, UNKNOWN_TIME};
pub use refresh::RecencyRefresher;

// Re-export core types for convenience
pub use lastseen_core::{
    parse_timestamp, AccessRecord, ActivityEvent, ConfigError, LastseenError, LastseenResult,
    RecencyConfig, ResourceId, SourceError, Timestamp,
};

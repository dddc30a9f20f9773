//! Access-recency cache with snapshot replacement and global expiry.
//!
//! # Design Philosophy
//!
//! The cache never merges incrementally. Each [`AccessRecencyCache::ingest`]
//! builds a complete [`Snapshot`] from one batch of activity events and swaps
//! it in whole, together with the time of the refresh. Readers clone the
//! current snapshot handle and work from it, so a reader never pairs entries
//! from one ingest with the refresh time of another.
//!
//! Expiry is global: the whole snapshot is either fresh or stale, decided
//! lazily at query time from the clock. Stale snapshots read as empty.
//!
//! # Example
//!
//! ```ignore
//! let cache = Arc::new(AccessRecencyCache::new(&RecencyConfig::default())?);
//! cache.ingest(&events);
//!
//! let badges = cache.get_last_access_times(["v1", "v2"]);
//! if let Some(Some(at)) = badges.get("v1") {
//!     println!("last watched {}", format_relative(at));
//! }
//! ```

pub mod extract;
pub mod freshness;
pub mod recency;
pub mod snapshot;
pub mod stats;

pub use extract::{Extraction, RecordExtractor};
pub use freshness::CacheState;
pub use recency::AccessRecencyCache;
pub use snapshot::Snapshot;
pub use stats::{CacheStats, IngestReport};

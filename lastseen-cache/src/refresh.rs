//! Periodic refresh of a shared cache from an activity feed.

use std::sync::Arc;
use std::time::Duration;

use lastseen_core::{LastseenResult, RecencyConfig};

use crate::cache::{AccessRecencyCache, IngestReport};
use crate::clock::{Clock, SystemClock};
use crate::feed::{collect_activity, ActivityFeed};

/// Pulls activity from a feed into a shared [`AccessRecencyCache`].
///
/// List views call [`refresh_if_due`] on render or on a timer and
/// [`refresh`] when the user explicitly asks to reload. A failed fetch
/// leaves the previous snapshot in place.
///
/// [`refresh_if_due`]: RecencyRefresher::refresh_if_due
/// [`refresh`]: RecencyRefresher::refresh
pub struct RecencyRefresher<F, C = SystemClock>
where
    F: ActivityFeed,
    C: Clock,
{
    cache: Arc<AccessRecencyCache<C>>,
    feed: F,
    refresh_interval: Duration,
    page_size: usize,
    max_pages: usize,
}

impl<F, C> RecencyRefresher<F, C>
where
    F: ActivityFeed,
    C: Clock,
{
    pub fn new(cache: Arc<AccessRecencyCache<C>>, feed: F, config: &RecencyConfig) -> Self {
        Self {
            cache,
            feed,
            refresh_interval: config.refresh_interval,
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }

    pub fn cache(&self) -> &Arc<AccessRecencyCache<C>> {
        &self.cache
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Whether the snapshot is missing, stale, or older than the refresh
    /// interval.
    pub fn is_due(&self) -> bool {
        let stats = self.cache.stats();
        match stats.age {
            None => true,
            Some(age) => stats.is_expired || age >= self.refresh_interval,
        }
    }

    /// Fetch the full batch and ingest it.
    pub async fn refresh(&self) -> LastseenResult<IngestReport> {
        let events = collect_activity(&self.feed, self.page_size, self.max_pages)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    feed = self.feed.name(),
                    error = %e,
                    "Activity fetch failed; keeping previous snapshot"
                );
            })?;

        self.cache.ingest(&events);
        Ok(self.cache.last_ingest_report())
    }

    /// Refresh only when [`is_due`](Self::is_due). Returns `None` when the
    /// current snapshot was kept.
    pub async fn refresh_if_due(&self) -> LastseenResult<Option<IngestReport>> {
        if !self.is_due() {
            return Ok(None);
        }
        self.refresh().await.map(Some)
    }
}

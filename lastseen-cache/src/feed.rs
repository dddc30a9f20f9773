//! The activity-log source seam.
//!
//! The cache never fetches anything itself. Whoever owns it pulls a batch of
//! events through an [`ActivityFeed`] and hands the batch to `ingest`. The
//! feed is typically a paginated list endpoint on a hosted database.

use async_trait::async_trait;
use lastseen_core::{ActivityEvent, LastseenResult};
use tokio::sync::RwLock;

/// One page request against a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityPageRequest {
    /// Number of events to skip, counted from the newest.
    pub offset: usize,
    pub limit: usize,
}

/// One page of events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPage {
    pub events: Vec<ActivityEvent>,
    /// Whether the source has events beyond this page.
    pub has_more: bool,
}

/// A paginated source of activity-log events.
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        "activity_log"
    }

    /// Fetch one page.
    async fn fetch_page(&self, request: ActivityPageRequest) -> LastseenResult<ActivityPage>;
}

/// Page through `feed` and return every event seen.
///
/// Stops when a page reports `has_more == false`, when a page comes back
/// short, or after `max_pages` pages. Errors abort the whole collection so a
/// partial batch is never ingested as if it were complete.
pub async fn collect_activity<F>(
    feed: &F,
    page_size: usize,
    max_pages: usize,
) -> LastseenResult<Vec<ActivityEvent>>
where
    F: ActivityFeed + ?Sized,
{
    let mut events = Vec::new();

    for page_index in 0..max_pages {
        let request = ActivityPageRequest {
            offset: page_index * page_size,
            limit: page_size,
        };
        let page = feed.fetch_page(request).await?;
        let fetched = page.events.len();
        events.extend(page.events);

        if !page.has_more || fetched < page_size {
            return Ok(events);
        }
    }

    tracing::warn!(
        feed = feed.name(),
        max_pages,
        collected = events.len(),
        "Activity feed has more pages than the page limit; using a truncated batch"
    );
    Ok(events)
}

/// A feed serving a fixed list of events, newest first.
///
/// Uses `tokio::sync::RwLock` so the list can be swapped while the feed is
/// shared across tasks.
#[derive(Debug, Default)]
pub struct InMemoryActivityFeed {
    events: RwLock<Vec<ActivityEvent>>,
}

impl InMemoryActivityFeed {
    pub fn new(events: Vec<ActivityEvent>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// Swap the served events.
    pub async fn replace(&self, events: Vec<ActivityEvent>) {
        *self.events.write().await = events;
    }

    /// Add an event at the head of the list.
    pub async fn push_newest(&self, event: ActivityEvent) {
        self.events.write().await.insert(0, event);
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl ActivityFeed for InMemoryActivityFeed {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch_page(&self, request: ActivityPageRequest) -> LastseenResult<ActivityPage> {
        let events = self.events.read().await;
        let start = request.offset.min(events.len());
        let end = start.saturating_add(request.limit).min(events.len());

        Ok(ActivityPage {
            events: events[start..end].to_vec(),
            has_more: end < events.len(),
        })
    }
}

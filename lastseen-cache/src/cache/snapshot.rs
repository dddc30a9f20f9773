//! Immutable result of one ingest call.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use lastseen_core::{AccessRecord, ActivityEvent, ResourceId, Timestamp};

use super::extract::{Extraction, RecordExtractor};
use super::freshness::{age_at, CacheState};
use super::stats::IngestReport;

/// Entries from exactly one ingest, paired with the time of that ingest.
///
/// A snapshot is never mutated after it is built; the cache replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: HashMap<ResourceId, AccessRecord>,
    refreshed_at: Option<Timestamp>,
    report: IngestReport,
}

impl Snapshot {
    /// The pre-ingest state: no entries, never refreshed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from one batch of events.
    ///
    /// Per resource id the record with the latest parsed timestamp wins.
    /// Comparison is strict, so among equal timestamps the first one seen is
    /// kept. A record whose timestamp does not parse never displaces one that
    /// does, and is displaced by any record that does.
    pub fn build(
        events: &[ActivityEvent],
        extractor: &RecordExtractor,
        refreshed_at: Timestamp,
    ) -> Self {
        let mut report = IngestReport {
            received: events.len(),
            ..Default::default()
        };
        let mut candidates: HashMap<ResourceId, (AccessRecord, Option<Timestamp>)> =
            HashMap::new();

        for event in events {
            let record = match extractor.extract(event) {
                Extraction::Untracked => {
                    report.untracked += 1;
                    continue;
                }
                Extraction::MissingId => {
                    report.missing_id += 1;
                    continue;
                }
                Extraction::Record(record) => record,
            };

            let accessed_at = event.occurred_at();
            if accessed_at.is_none() {
                report.malformed_timestamp += 1;
            }

            match candidates.entry(record.resource_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert((record, accessed_at));
                }
                Entry::Occupied(mut slot) => {
                    report.superseded += 1;
                    if is_more_recent(accessed_at, slot.get().1) {
                        slot.insert((record, accessed_at));
                    }
                }
            }
        }

        let entries: HashMap<_, _> = candidates
            .into_iter()
            .map(|(id, (record, _))| (id, record))
            .collect();
        report.retained = entries.len();

        Self {
            entries,
            refreshed_at: Some(refreshed_at),
            report,
        }
    }

    pub fn entries(&self) -> &HashMap<ResourceId, AccessRecord> {
        &self.entries
    }

    pub fn get(&self, resource_id: &str) -> Option<&AccessRecord> {
        self.entries.get(resource_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn refreshed_at(&self) -> Option<Timestamp> {
        self.refreshed_at
    }

    pub fn report(&self) -> IngestReport {
        self.report
    }

    /// Time since this snapshot was ingested.
    pub fn age(&self, now: Timestamp) -> Option<Duration> {
        age_at(self.refreshed_at, now)
    }

    pub fn state(&self, now: Timestamp, ttl: Duration) -> CacheState {
        CacheState::evaluate(self.refreshed_at, now, ttl)
    }
}

fn is_more_recent(candidate: Option<Timestamp>, current: Option<Timestamp>) -> bool {
    match (candidate, current) {
        (Some(candidate), Some(current)) => candidate > current,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

//! Turning raw activity events into access records.

use lastseen_core::{AccessRecord, ActivityEvent, RecencyConfig, ResourceId};
use serde_json::Value;

/// Context field carrying the resource's display name.
const LABEL_FIELD: &str = "title";
/// Context field carrying the playback offset.
const POSITION_FIELD: &str = "position";
const WATCH_DURATION_FIELD: &str = "watch_duration";
const ACCESSED_AT_FIELD: &str = "accessed_at";

/// Outcome of examining one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The event is not of the tracked kind.
    Untracked,
    /// The event is tracked but names no resource.
    MissingId,
    Record(AccessRecord),
}

/// Filters events by kind and resolves their resource id.
///
/// The id is looked up in the top-level `id_field` of the context first,
/// then along `fallback_id_path` when one is configured. Strings must be
/// non-blank; numbers are rendered in decimal; anything else is unresolvable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordExtractor {
    tracked_kind: String,
    id_field: String,
    fallback_id_path: Option<Vec<String>>,
}

impl RecordExtractor {
    pub fn new(
        tracked_kind: impl Into<String>,
        id_field: impl Into<String>,
        fallback_id_path: Option<Vec<String>>,
    ) -> Self {
        Self {
            tracked_kind: tracked_kind.into(),
            id_field: id_field.into(),
            fallback_id_path,
        }
    }

    pub fn from_config(config: &RecencyConfig) -> Self {
        Self::new(
            config.tracked_kind.clone(),
            config.id_field.clone(),
            config.fallback_id_path.clone(),
        )
    }

    pub fn tracked_kind(&self) -> &str {
        &self.tracked_kind
    }

    pub fn is_tracked(&self, event: &ActivityEvent) -> bool {
        event.activity_kind == self.tracked_kind
    }

    /// Resolve the resource id, primary field first.
    pub fn resolve_id(&self, event: &ActivityEvent) -> Option<ResourceId> {
        event
            .context_field(&self.id_field)
            .and_then(id_from_value)
            .or_else(|| {
                let path = self.fallback_id_path.as_deref()?;
                event.context_path(path).and_then(id_from_value)
            })
    }

    /// Classify an event and, when it qualifies, build its record.
    ///
    /// The record's `last_access_time` is the event timestamp verbatim.
    pub fn extract(&self, event: &ActivityEvent) -> Extraction {
        if !self.is_tracked(event) {
            return Extraction::Untracked;
        }

        let Some(resource_id) = self.resolve_id(event) else {
            return Extraction::MissingId;
        };

        Extraction::Record(AccessRecord {
            resource_id,
            last_access_time: event.timestamp.clone(),
            position_marker: event.context_field(POSITION_FIELD).and_then(Value::as_f64),
            label: event
                .context_field(LABEL_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            watch_duration: event
                .context_field(WATCH_DURATION_FIELD)
                .and_then(Value::as_f64),
            accessed_at_raw: event
                .context_field(ACCESSED_AT_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::from_config(&RecencyConfig::default())
    }
}

fn id_from_value(value: &Value) -> Option<ResourceId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//! Activity-log events and normalized access records

use crate::identity::{parse_timestamp, ResourceId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw record from the activity-log source.
///
/// Only `activity_kind`, `timestamp` and `context` matter to the cache. The
/// context is loosely typed: the resource id and passthrough fields are
/// pulled out of it during ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Source-side identifier of the log row, if the source provides one.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "activity_type")]
    pub activity_kind: String,
    /// ISO-8601 time the activity happened.
    #[serde(alias = "created_at")]
    pub timestamp: String,
    #[serde(default)]
    pub context: Option<Value>,
}

impl ActivityEvent {
    /// Create an event with no context.
    pub fn new(activity_kind: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: None,
            activity_kind: activity_kind.into(),
            timestamp: timestamp.into(),
            context: None,
        }
    }

    /// Set the source-side row id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a context payload.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Parsed `timestamp`, or `None` if it is malformed.
    pub fn occurred_at(&self) -> Option<Timestamp> {
        parse_timestamp(&self.timestamp)
    }

    /// Look up a top-level context field.
    pub fn context_field(&self, key: &str) -> Option<&Value> {
        self.context.as_ref()?.get(key)
    }

    /// Walk a nested context path, e.g. `["video", "id"]`.
    pub fn context_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        path.iter()
            .try_fold(self.context.as_ref()?, |value, key| value.get(key.as_ref()))
    }
}

/// The most recent known access of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub resource_id: ResourceId,
    /// Access time, verbatim from the winning source event.
    pub last_access_time: String,
    /// Opaque secondary value such as a playback offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_marker: Option<f64>,
    /// Display name of the resource at the time of access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_at_raw: Option<String>,
}

impl AccessRecord {
    /// Create a record with no passthrough fields.
    pub fn new(resource_id: impl Into<ResourceId>, last_access_time: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            last_access_time: last_access_time.into(),
            position_marker: None,
            label: None,
            watch_duration: None,
            accessed_at_raw: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_position_marker(mut self, position: f64) -> Self {
        self.position_marker = Some(position);
        self
    }

    pub fn with_watch_duration(mut self, duration: f64) -> Self {
        self.watch_duration = Some(duration);
        self
    }

    pub fn with_accessed_at_raw(mut self, raw: impl Into<String>) -> Self {
        self.accessed_at_raw = Some(raw.into());
        self
    }

    /// Parsed `last_access_time`, or `None` if it is malformed.
    pub fn accessed_at(&self) -> Option<Timestamp> {
        parse_timestamp(&self.last_access_time)
    }
}

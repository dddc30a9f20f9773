//! lastseen Core - Data Types
//!
//! Pure data structures shared by the cache and its consumers: the raw
//! activity-log event shape, the normalized access record, timestamp
//! parsing, configuration, and the error taxonomy.
//!
//! This crate contains no caching behavior.

pub mod activity;
pub mod config;
pub mod error;
pub mod identity;

pub use activity::{AccessRecord, ActivityEvent};
pub use config::RecencyConfig;
pub use error::{ConfigError, LastseenError, LastseenResult, SourceError};
pub use identity::{parse_timestamp, ResourceId, Timestamp};

//! Cursor and partition identity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Active storage location of an event type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeline {
    /// Event type this timeline serves
    pub event_type: String,
    /// Physical topic currently holding the event type's data
    pub topic: String,
    /// Storage backend the topic lives in; selects the [`StorageDriver`](super::StorageDriver)
    pub storage_id: String,
}

impl Timeline {
    pub fn new(
        event_type: impl Into<String>,
        topic: impl Into<String>,
        storage_id: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            topic: topic.into(),
            storage_id: storage_id.into(),
        }
    }
}

/// Position within one partition of an event type's timeline
///
/// The offset is opaque; only the timeline's storage driver knows how two
/// offsets compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub timeline: Timeline,
    pub partition: String,
    pub offset: String,
}

impl Cursor {
    pub fn new(timeline: Timeline, partition: impl Into<String>, offset: impl Into<String>) -> Self {
        Self {
            timeline,
            partition: partition.into(),
            offset: offset.into(),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.timeline.event_type
    }

    pub fn topic(&self) -> &str {
        &self.timeline.topic
    }

    /// Grouping key for commits
    pub fn event_type_partition(&self) -> EventTypePartition {
        EventTypePartition::new(self.event_type(), self.partition.clone())
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{event_type: {}, partition: {}, offset: {}}}",
            self.timeline.event_type, self.partition, self.offset
        )
    }
}

/// (event type, partition) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventTypePartition {
    pub event_type: String,
    pub partition: String,
}

impl EventTypePartition {
    pub fn new(event_type: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            partition: partition.into(),
        }
    }
}

impl fmt::Display for EventTypePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.event_type, self.partition)
    }
}

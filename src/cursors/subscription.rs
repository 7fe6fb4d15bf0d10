//! Subscription, event type and partition assignment records

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Named consumption group over one or more event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub event_types: BTreeSet<String>,
}

impl Subscription {
    pub fn new<I, S>(id: impl Into<String>, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            event_types: event_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains_event_type(&self, event_type: &str) -> bool {
        self.event_types.contains(event_type)
    }
}

/// Event type metadata relevant to cursor access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub name: String,
    /// Scopes a client needs to read the event type; empty means unrestricted
    #[serde(default)]
    pub read_scopes: BTreeSet<String>,
}

impl EventType {
    pub fn new<I, S>(name: impl Into<String>, read_scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            read_scopes: read_scopes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ownership phase of a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionState {
    Unassigned,
    Assigned,
    Reassigning,
}

/// Value of a partition assignment node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionAssignment {
    pub state: PartitionState,
    /// Stream currently holding commit rights
    #[serde(default)]
    pub session: String,
    /// Stream taking over while reassigning, empty otherwise
    #[serde(default)]
    pub next_session: String,
}

impl PartitionAssignment {
    pub fn assigned(session: impl Into<String>) -> Self {
        Self {
            state: PartitionState::Assigned,
            session: session.into(),
            next_session: String::new(),
        }
    }

    pub fn unassigned() -> Self {
        Self {
            state: PartitionState::Unassigned,
            session: String::new(),
            next_session: String::new(),
        }
    }

    /// Owning stream, if any
    pub fn owner(&self) -> Option<&str> {
        (!self.session.is_empty()).then_some(self.session.as_str())
    }
}

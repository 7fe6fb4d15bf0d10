//! Lookups into subscription, event type and timeline metadata
//!
//! The cursor layer only reads this metadata. The traits are implemented by
//! whatever owns the catalogs; [`InMemoryCatalog`] serves embedded use and
//! tests.

use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::{EventType, StorageDriver, Subscription, Timeline};
use crate::error::{Result, StreamlineError};

#[async_trait]
pub trait SubscriptionStore: Send + Sync + Debug {
    /// Fails with `SubscriptionNotFound` for an unknown id
    async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription>;
}

#[async_trait]
pub trait EventTypeStore: Send + Sync + Debug {
    /// Fails with `EventTypeNotFound` for an unknown name
    async fn find_by_name(&self, name: &str) -> Result<EventType>;
}

#[async_trait]
pub trait TimelineResolver: Send + Sync + Debug {
    /// Active timeline of an event type
    async fn get_timeline(&self, event_type: &str) -> Result<Timeline>;

    /// Driver for the storage a timeline lives in
    async fn storage_driver(&self, timeline: &Timeline) -> Result<Arc<dyn StorageDriver>>;
}

/// Catalog held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    subscriptions: DashMap<String, Subscription>,
    event_types: DashMap<String, EventType>,
    timelines: DashMap<String, Timeline>,
    drivers: DashMap<String, Arc<dyn StorageDriver>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_subscription(&self, subscription: Subscription) {
        self.subscriptions.insert(subscription.id.clone(), subscription);
    }

    pub fn put_event_type(&self, event_type: EventType) {
        self.event_types.insert(event_type.name.clone(), event_type);
    }

    /// Make `timeline` the active timeline of its event type
    pub fn put_timeline(&self, timeline: Timeline) {
        self.timelines.insert(timeline.event_type.clone(), timeline);
    }

    pub fn register_driver(&self, storage_id: impl Into<String>, driver: Arc<dyn StorageDriver>) {
        self.drivers.insert(storage_id.into(), driver);
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryCatalog {
    async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.subscriptions
            .get(subscription_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StreamlineError::SubscriptionNotFound(subscription_id.to_string()))
    }
}

#[async_trait]
impl EventTypeStore for InMemoryCatalog {
    async fn find_by_name(&self, name: &str) -> Result<EventType> {
        self.event_types
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StreamlineError::EventTypeNotFound(name.to_string()))
    }
}

#[async_trait]
impl TimelineResolver for InMemoryCatalog {
    async fn get_timeline(&self, event_type: &str) -> Result<Timeline> {
        self.timelines
            .get(event_type)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StreamlineError::EventTypeNotFound(event_type.to_string()))
    }

    async fn storage_driver(&self, timeline: &Timeline) -> Result<Arc<dyn StorageDriver>> {
        self.drivers
            .get(&timeline.storage_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                StreamlineError::Internal(format!(
                    "No storage driver registered for storage '{}'",
                    timeline.storage_id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursors::KafkaStorageDriver;

    #[tokio::test]
    async fn test_lookups() {
        let catalog = InMemoryCatalog::new();
        catalog.put_subscription(Subscription::new("s1", ["orders"]));
        catalog.put_event_type(EventType::new("orders", ["orders.read"]));
        catalog.put_timeline(Timeline::new("orders", "orders-topic", "kafka"));
        catalog.register_driver("kafka", Arc::new(KafkaStorageDriver::new()));

        let subscription = catalog.get_subscription("s1").await.unwrap();
        assert!(subscription.contains_event_type("orders"));

        let event_type = catalog.find_by_name("orders").await.unwrap();
        assert!(event_type.read_scopes.contains("orders.read"));

        let timeline = catalog.get_timeline("orders").await.unwrap();
        assert_eq!(timeline.topic, "orders-topic");
        assert!(catalog.storage_driver(&timeline).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_entries() {
        let catalog = InMemoryCatalog::new();
        assert!(matches!(
            catalog.get_subscription("nope").await,
            Err(StreamlineError::SubscriptionNotFound(_))
        ));
        assert!(matches!(
            catalog.find_by_name("nope").await,
            Err(StreamlineError::EventTypeNotFound(_))
        ));
        let timeline = Timeline::new("orders", "orders-topic", "unknown");
        assert!(matches!(
            catalog.storage_driver(&timeline).await,
            Err(StreamlineError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_put_timeline_replaces_active() {
        let catalog = InMemoryCatalog::new();
        catalog.put_timeline(Timeline::new("orders", "orders-v1", "kafka"));
        catalog.put_timeline(Timeline::new("orders", "orders-v2", "kafka"));
        assert_eq!(catalog.get_timeline("orders").await.unwrap().topic, "orders-v2");
    }
}

//! Shared test fixtures for cursor integration tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Features
//!
//! - `Fixture`: in-memory store and catalog wired into a `CursorsService`
//! - Session and assignment helpers mirroring what the session manager writes
//! - Cursor and client builders
//! - `GatedStore`: store wrapper that holds one write until released

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use streamline_cursors::auth::ScopedClient;
use streamline_cursors::config::CursorsConfig;
use streamline_cursors::coordination::{
    paths, CoordinationResult, CoordinationStore, InMemoryCoordinationStore, Stat,
};
use streamline_cursors::cursors::{
    Cursor, CursorsService, EventType, InMemoryCatalog, KafkaStorageDriver, PartitionAssignment,
    Subscription, Timeline,
};
use tokio::sync::Notify;

// ============================================================================
// Test Data
// ============================================================================

pub const SUBSCRIPTION: &str = "sub-1";
pub const STREAM_A: &str = "stream-a";
pub const STREAM_B: &str = "stream-b";

pub const ORDERS: &str = "orders";
pub const ORDERS_TOPIC: &str = "orders-topic";
pub const PAYMENTS: &str = "payments";
pub const PAYMENTS_TOPIC: &str = "payments-topic";

pub fn orders_timeline() -> Timeline {
    Timeline::new(ORDERS, ORDERS_TOPIC, "kafka")
}

pub fn payments_timeline() -> Timeline {
    Timeline::new(PAYMENTS, PAYMENTS_TOPIC, "kafka")
}

pub fn orders(partition: &str, offset: &str) -> Cursor {
    Cursor::new(orders_timeline(), partition, offset)
}

pub fn payments(partition: &str, offset: &str) -> Cursor {
    Cursor::new(payments_timeline(), partition, offset)
}

/// Client allowed to read both event types
pub fn reader() -> ScopedClient {
    ScopedClient::new("reader", ["orders.read", "payments.read"])
}

/// Catalog with subscription `sub-1` over `orders` and `payments`
pub fn catalog() -> Arc<InMemoryCatalog> {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.put_subscription(Subscription::new(SUBSCRIPTION, [ORDERS, PAYMENTS]));
    catalog.put_event_type(EventType::new(ORDERS, ["orders.read"]));
    catalog.put_event_type(EventType::new(PAYMENTS, ["payments.read"]));
    catalog.put_timeline(orders_timeline());
    catalog.put_timeline(payments_timeline());
    catalog.register_driver("kafka", Arc::new(KafkaStorageDriver::new()));
    catalog
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub store: Arc<InMemoryCoordinationStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub service: CursorsService,
}

impl Fixture {
    /// Subscription `sub-1` over `orders` and `payments`, nothing assigned yet
    pub fn new() -> Self {
        Self::with_config(CursorsConfig::default())
    }

    pub fn with_config(config: CursorsConfig) -> Self {
        let catalog = catalog();
        let store = Arc::new(InMemoryCoordinationStore::new());
        let service = CursorsService::with_catalog(store.clone(), catalog.clone(), config);
        Self {
            store,
            catalog,
            service,
        }
    }

    /// Service over the same data whose store calls go through `store`
    pub fn service_over(
        &self,
        store: Arc<dyn CoordinationStore>,
        config: CursorsConfig,
    ) -> CursorsService {
        CursorsService::with_catalog(store, self.catalog.clone(), config)
    }

    /// Register a live session for `stream_id`
    pub async fn open_session(&self, stream_id: &str) {
        self.store
            .create(&paths::session(SUBSCRIPTION, stream_id), Bytes::new())
            .await
            .unwrap();
    }

    /// Write the assignment record of a partition
    pub async fn assign(&self, topic: &str, partition: &str, stream_id: &str) {
        let path = paths::partition(SUBSCRIPTION, topic, partition);
        let record = Bytes::from(serde_json::to_vec(&PartitionAssignment::assigned(stream_id)).unwrap());
        match self.store.get_data(&path).await {
            Ok((_, stat)) => {
                self.store.set_data(&path, record, stat.version).await.unwrap();
            }
            Err(_) => {
                self.store.create(&path, record).await.unwrap();
            }
        }
    }

    /// Open `stream_id` and give it the listed orders partitions
    pub async fn stream_owning_orders(&self, stream_id: &str, partitions: &[&str]) {
        self.open_session(stream_id).await;
        for partition in partitions {
            self.assign(ORDERS_TOPIC, partition, stream_id).await;
        }
    }

    pub async fn assignment(&self, topic: &str, partition: &str) -> PartitionAssignment {
        let (data, _) = self
            .store
            .get_data(&paths::partition(SUBSCRIPTION, topic, partition))
            .await
            .unwrap();
        serde_json::from_slice(&data).unwrap()
    }

    pub async fn stored_offset(&self, topic: &str, partition: &str) -> Option<String> {
        match self
            .store
            .get_data(&paths::offset(SUBSCRIPTION, topic, partition))
            .await
        {
            Ok((data, _)) => Some(String::from_utf8(data.to_vec()).unwrap()),
            Err(e) if e.is_no_node() => None,
            Err(e) => panic!("unexpected store error {:?}", e),
        }
    }

    pub async fn set_offset(&self, topic: &str, partition: &str, offset: &str) {
        let path = paths::offset(SUBSCRIPTION, topic, partition);
        let data = Bytes::copy_from_slice(offset.as_bytes());
        match self.store.get_data(&path).await {
            Ok((_, stat)) => {
                self.store.set_data(&path, data, stat.version).await.unwrap();
            }
            Err(_) => {
                self.store.create(&path, data).await.unwrap();
            }
        }
    }

    pub async fn session_exists(&self, stream_id: &str) -> bool {
        self.store
            .exists(&paths::session(SUBSCRIPTION, stream_id))
            .await
            .unwrap()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Gated store
// ============================================================================

/// Delegates to an in-memory store but holds the first `set_data` on
/// `path` until [`GatedStore::release`] is called
#[derive(Debug)]
pub struct GatedStore {
    inner: Arc<InMemoryCoordinationStore>,
    path: String,
    armed: AtomicBool,
    reached: Notify,
    released: Notify,
}

impl GatedStore {
    pub fn new(inner: Arc<InMemoryCoordinationStore>, path: impl Into<String>) -> Self {
        Self {
            inner,
            path: path.into(),
            armed: AtomicBool::new(true),
            reached: Notify::new(),
            released: Notify::new(),
        }
    }

    /// Wait until the held write has been issued
    pub async fn wait_until_held(&self) {
        self.reached.notified().await;
    }

    /// Let the held write through
    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[async_trait]
impl CoordinationStore for GatedStore {
    async fn get_data(&self, path: &str) -> CoordinationResult<(Bytes, Stat)> {
        self.inner.get_data(path).await
    }

    async fn create(&self, path: &str, data: Bytes) -> CoordinationResult<Stat> {
        self.inner.create(path, data).await
    }

    async fn set_data(
        &self,
        path: &str,
        data: Bytes,
        expected_version: i32,
    ) -> CoordinationResult<Stat> {
        if path == self.path && self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.released.notified().await;
        }
        self.inner.set_data(path, data, expected_version).await
    }

    async fn exists(&self, path: &str) -> CoordinationResult<bool> {
        self.inner.exists(path).await
    }

    async fn get_children(&self, path: &str) -> CoordinationResult<Vec<String>> {
        self.inner.get_children(path).await
    }

    async fn delete(&self, path: &str) -> CoordinationResult<()> {
        self.inner.delete(path).await
    }
}

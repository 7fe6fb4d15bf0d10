#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # Streamline Cursors
//!
//! Consumer offset coordination for Streamline subscriptions. Tracks, per
//! subscription and partition, how far a group of consumers has progressed and
//! lets them move that position concurrently without a central lock.
//!
//! ## Features
//!
//! - **Monotonic commits**: a committed offset never regresses, whatever the
//!   interleaving of concurrent commits
//! - **Ownership checks**: only the stream currently assigned a partition may
//!   commit to it
//! - **Optimistic concurrency**: version-checked writes with a bounded retry
//! - **Pluggable storage semantics**: offset ordering and validation per
//!   storage backend
//! - **Forced reset**: marker-guarded rewrite that detaches affected streams
//!
//! ## Library Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use streamline_cursors::auth::FullAccessClient;
//! use streamline_cursors::config::CursorsConfig;
//! use streamline_cursors::coordination::InMemoryCoordinationStore;
//! use streamline_cursors::cursors::{
//!     Cursor, CursorsService, EventType, InMemoryCatalog, KafkaStorageDriver, Subscription,
//!     Timeline,
//! };
//!
//! #[tokio::main]
//! async fn main() -> streamline_cursors::Result<()> {
//!     let catalog = Arc::new(InMemoryCatalog::new());
//!     catalog.put_subscription(Subscription::new("sub-1", ["orders"]));
//!     catalog.put_event_type(EventType::new("orders", ["orders.read"]));
//!     catalog.put_timeline(Timeline::new("orders", "orders-topic", "kafka"));
//!     catalog.register_driver("kafka", Arc::new(KafkaStorageDriver::new()));
//!
//!     let store = Arc::new(InMemoryCoordinationStore::new());
//!     let service = CursorsService::with_catalog(store, catalog, CursorsConfig::default());
//!
//!     let client = FullAccessClient::default();
//!     let cursor = Cursor::new(Timeline::new("orders", "orders-topic", "kafka"), "0", "000000000000000042");
//!     let committed = service
//!         .commit_cursors("stream-1", "sub-1", &[cursor], &client)
//!         .await?;
//!     println!("committed: {:?}", committed);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`cursors`]: validation, ownership, commit, read and reset paths
//! - [`coordination`]: versioned key-value store abstraction and node layout
//! - [`auth`]: caller scope checks
//! - [`config`]: configuration file and environment overrides
//! - [`logging`]: tracing subscriber setup
//! - [`metrics`]: commit and reset metrics
//! - [`error`]: Error types and Result alias
//!
//! ## Configuration
//!
//! | Option | Env Variable | Default | Description |
//! |--------|--------------|---------|-------------|
//! | `cursors.default_commit_timeout_secs` | `STREAMLINE_CURSORS_COMMIT_TIMEOUT_SECS` | `60` | Commit timeout; resets get one extra second |
//! | `logging.level` | `STREAMLINE_CURSORS_LOG_LEVEL` | `info` | Log filter when `RUST_LOG` is unset |

pub mod auth;
pub mod config;
pub mod coordination;
pub mod cursors;
pub mod error;
pub mod logging;
pub mod metrics;

pub use auth::{Client, FullAccessClient, ScopedClient};
pub use config::CursorsConfig;
pub use coordination::{CoordinationStore, InMemoryCoordinationStore};
pub use cursors::{Cursor, CursorsService, EventTypePartition, StorageDriver, Timeline};
pub use error::{ErrorHint, ErrorStatus, Result, StreamlineError};

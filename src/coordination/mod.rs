//! Coordination store abstraction
//!
//! Cursor bookkeeping lives in a hierarchical, versioned key-value store
//! (ZooKeeper-style): every node has a path, a byte payload and a version that
//! the store bumps on each successful write. Mutation goes exclusively
//! through the version-checked [`CoordinationStore::set_data`]; there is no
//! application-level lock around the store.
//!
//! ## Backends
//!
//! - [`InMemoryCoordinationStore`]: process-local store for embedded use and tests
//!
//! ## Layout
//!
//! See [`paths`] for the node layout used by subscriptions.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::error::CoordinationError;

mod client;
pub mod memory;
pub mod paths;

pub use client::CoordinationClient;
pub use memory::InMemoryCoordinationStore;

/// Result of a raw coordination store call
pub type CoordinationResult<T> = std::result::Result<T, CoordinationError>;

/// Node metadata returned with reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Incremented by the store on every successful write, starts at 0
    pub version: i32,
}

/// Hierarchical versioned key-value store
#[async_trait]
pub trait CoordinationStore: Send + Sync + Debug {
    /// Read a node's payload together with its current version
    async fn get_data(&self, path: &str) -> CoordinationResult<(Bytes, Stat)>;

    /// Create a node, creating missing ancestors as empty containers
    ///
    /// Fails with `NodeExists` if the node is already present.
    async fn create(&self, path: &str, data: Bytes) -> CoordinationResult<Stat>;

    /// Overwrite a node only if its version still equals `expected_version`
    ///
    /// Fails with `BadVersion` on mismatch and `NoNode` if absent.
    async fn set_data(
        &self,
        path: &str,
        data: Bytes,
        expected_version: i32,
    ) -> CoordinationResult<Stat>;

    /// Check whether a node exists
    async fn exists(&self, path: &str) -> CoordinationResult<bool>;

    /// Names (not full paths) of a node's direct children, sorted
    async fn get_children(&self, path: &str) -> CoordinationResult<Vec<String>>;

    /// Remove a node and everything below it
    async fn delete(&self, path: &str) -> CoordinationResult<()>;
}

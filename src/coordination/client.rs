//! Shared handle over a coordination store
//!
//! Translates raw store failures into service errors and decodes payloads.
//! Only "node absent" is turned into `None`; every other failure surfaces as
//! `ServiceUnavailable`.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::error;

use super::{CoordinationResult, CoordinationStore, Stat};
use crate::error::{CoordinationError, Result, StreamlineError};

/// Cloneable handle used by the cursor services
#[derive(Clone, Debug)]
pub struct CoordinationClient {
    store: Arc<dyn CoordinationStore>,
}

impl CoordinationClient {
    pub fn new(store: Arc<dyn CoordinationStore>) -> Self {
        Self { store }
    }

    /// Map a store failure to `ServiceUnavailable`, logging it once
    pub fn unavailable(operation: &str, err: &CoordinationError) -> StreamlineError {
        error!(operation = %operation, error = %err, "Coordination store failure");
        StreamlineError::coordination(operation, err)
    }

    /// Read a node as UTF-8 text, `None` if the node is absent
    pub async fn read_utf8(&self, path: &str, operation: &str) -> Result<Option<(String, Stat)>> {
        match self.store.get_data(path).await {
            Ok((data, stat)) => {
                let text = String::from_utf8(data.to_vec()).map_err(|e| {
                    error!(path = %path, error = %e, "Coordination node is not valid UTF-8");
                    StreamlineError::ServiceUnavailable(format!(
                        "{}: node {} is not valid UTF-8: {}",
                        operation, path, e
                    ))
                })?;
                Ok(Some((text, stat)))
            }
            Err(e) if e.is_no_node() => Ok(None),
            Err(e) => Err(Self::unavailable(operation, &e)),
        }
    }

    /// Read and decode a JSON node, `None` if the node is absent
    ///
    /// A payload that does not decode is reported as `ServiceUnavailable`:
    /// the store holds something this process cannot interpret.
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> Result<Option<(T, Stat)>> {
        match self.store.get_data(path).await {
            Ok((data, stat)) => {
                let value = serde_json::from_slice(&data).map_err(|e| {
                    error!(path = %path, error = %e, "Undecodable coordination node");
                    StreamlineError::ServiceUnavailable(format!(
                        "{}: malformed node {}: {}",
                        operation, path, e
                    ))
                })?;
                Ok(Some((value, stat)))
            }
            Err(e) if e.is_no_node() => Ok(None),
            Err(e) => Err(Self::unavailable(operation, &e)),
        }
    }

    pub async fn exists(&self, path: &str, operation: &str) -> Result<bool> {
        self.store
            .exists(path)
            .await
            .map_err(|e| Self::unavailable(operation, &e))
    }

    /// Children of a node, `None` if the node is absent
    pub async fn children(&self, path: &str, operation: &str) -> Result<Option<Vec<String>>> {
        match self.store.get_children(path).await {
            Ok(children) => Ok(Some(children)),
            Err(e) if e.is_no_node() => Ok(None),
            Err(e) => Err(Self::unavailable(operation, &e)),
        }
    }

    /// Delete a subtree, ignoring an already-absent node
    pub async fn delete_if_exists(&self, path: &str, operation: &str) -> Result<()> {
        match self.store.delete(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_no_node() => Ok(()),
            Err(e) => Err(Self::unavailable(operation, &e)),
        }
    }

    /// Conditional write: `Some(version)` updates, `None` creates
    ///
    /// Raw store errors are returned so callers can tell a lost race apart
    /// from a broken store.
    pub async fn write_conditional(
        &self,
        path: &str,
        data: Bytes,
        expected_version: Option<i32>,
    ) -> CoordinationResult<Stat> {
        match expected_version {
            Some(version) => self.store.set_data(path, data, version).await,
            None => self.store.create(path, data).await,
        }
    }

    pub async fn create(&self, path: &str, data: Bytes) -> CoordinationResult<Stat> {
        self.store.create(path, data).await
    }
}

//! In-memory coordination store
//!
//! Keeps the node tree in an ordered map guarded by a `parking_lot` lock; the
//! lock is never held across an `.await`. Besides serving embedded
//! deployments it offers fault injection so callers can exercise version
//! races and connectivity loss deterministically.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

use super::{CoordinationResult, CoordinationStore, Stat};
use crate::error::CoordinationError;

#[derive(Debug)]
struct Node {
    data: Bytes,
    version: i32,
}

/// Process-local [`CoordinationStore`]
#[derive(Debug, Default)]
pub struct InMemoryCoordinationStore {
    nodes: RwLock<BTreeMap<String, Node>>,
    /// Pending forced conflicts per path
    conflicts: Mutex<HashMap<String, usize>>,
    unavailable: AtomicBool,
}

impl InMemoryCoordinationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `ConnectionLoss` (or recover)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make the next `count` writes to `path` lose their version race
    ///
    /// Conditional writes fail with `BadVersion`, creates with `NodeExists`;
    /// the stored node is left untouched.
    pub fn inject_version_conflicts(&self, path: &str, count: usize) {
        self.conflicts.lock().insert(path.to_string(), count);
    }

    /// Number of forced conflicts still pending for `path`
    pub fn pending_conflicts(&self, path: &str) -> usize {
        self.conflicts.lock().get(path).copied().unwrap_or(0)
    }

    fn check_available(&self) -> CoordinationResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoordinationError::connection_loss(
                "coordination store is unavailable",
            ));
        }
        Ok(())
    }

    fn take_conflict(&self, path: &str) -> bool {
        let mut conflicts = self.conflicts.lock();
        match conflicts.get_mut(path) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Every proper ancestor of `path`, outermost first ("/a/b/c" -> "/a", "/a/b")
    fn ancestors(path: &str) -> impl Iterator<Item = &str> {
        path.match_indices('/')
            .skip(1)
            .map(move |(index, _)| &path[..index])
    }

    fn validate_path(path: &str) -> CoordinationResult<()> {
        if !path.starts_with('/') || path.len() < 2 || path.ends_with('/') || path.contains("//")
        {
            return Err(CoordinationError::no_node(path));
        }
        Ok(())
    }
}

#[async_trait]
impl CoordinationStore for InMemoryCoordinationStore {
    async fn get_data(&self, path: &str) -> CoordinationResult<(Bytes, Stat)> {
        self.check_available()?;
        let nodes = self.nodes.read();
        nodes
            .get(path)
            .map(|node| {
                (
                    node.data.clone(),
                    Stat {
                        version: node.version,
                    },
                )
            })
            .ok_or_else(|| CoordinationError::no_node(path))
    }

    async fn create(&self, path: &str, data: Bytes) -> CoordinationResult<Stat> {
        self.check_available()?;
        Self::validate_path(path)?;
        if self.take_conflict(path) {
            return Err(CoordinationError::node_exists(path));
        }

        let mut nodes = self.nodes.write();
        if nodes.contains_key(path) {
            return Err(CoordinationError::node_exists(path));
        }
        for ancestor in Self::ancestors(path) {
            nodes.entry(ancestor.to_string()).or_insert_with(|| Node {
                data: Bytes::new(),
                version: 0,
            });
        }
        nodes.insert(path.to_string(), Node { data, version: 0 });
        trace!(path = %path, "Created node");
        Ok(Stat { version: 0 })
    }

    async fn set_data(
        &self,
        path: &str,
        data: Bytes,
        expected_version: i32,
    ) -> CoordinationResult<Stat> {
        self.check_available()?;
        if self.take_conflict(path) {
            return Err(CoordinationError::bad_version(path, expected_version));
        }

        let mut nodes = self.nodes.write();
        let node = nodes
            .get_mut(path)
            .ok_or_else(|| CoordinationError::no_node(path))?;
        if node.version != expected_version {
            return Err(CoordinationError::bad_version(path, expected_version));
        }
        node.data = data;
        node.version += 1;
        trace!(path = %path, version = node.version, "Updated node");
        Ok(Stat {
            version: node.version,
        })
    }

    async fn exists(&self, path: &str) -> CoordinationResult<bool> {
        self.check_available()?;
        Ok(self.nodes.read().contains_key(path))
    }

    async fn get_children(&self, path: &str) -> CoordinationResult<Vec<String>> {
        self.check_available()?;
        let nodes = self.nodes.read();
        if !nodes.contains_key(path) {
            return Err(CoordinationError::no_node(path));
        }

        let prefix = format!("{}/", path);
        let children = nodes
            .range::<str, _>((Bound::Excluded(prefix.as_str()), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(&prefix))
            .filter_map(|key| {
                let rest = &key[prefix.len()..];
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        Ok(children)
    }

    async fn delete(&self, path: &str) -> CoordinationResult<()> {
        self.check_available()?;
        let mut nodes = self.nodes.write();
        if nodes.remove(path).is_none() {
            return Err(CoordinationError::no_node(path));
        }

        let prefix = format!("{}/", path);
        let descendants: Vec<String> = nodes
            .range::<str, _>((Bound::Excluded(prefix.as_str()), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in descendants {
            nodes.remove(&key);
        }
        trace!(path = %path, "Deleted node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let store = InMemoryCoordinationStore::new();
        let stat = store.create("/a/b/c", data("hello")).await.unwrap();
        assert_eq!(stat.version, 0);

        let (payload, stat) = store.get_data("/a/b/c").await.unwrap();
        assert_eq!(payload, data("hello"));
        assert_eq!(stat.version, 0);

        // ancestors are created as empty containers
        assert!(store.exists("/a").await.unwrap());
        assert!(store.exists("/a/b").await.unwrap());
        assert_eq!(store.get_data("/a/b").await.unwrap().0, Bytes::new());
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let store = InMemoryCoordinationStore::new();
        store.create("/a", data("1")).await.unwrap();
        let err = store.create("/a", data("2")).await.unwrap_err();
        assert_eq!(err, CoordinationError::node_exists("/a"));
    }

    #[tokio::test]
    async fn test_set_data_checks_version() {
        let store = InMemoryCoordinationStore::new();
        store.create("/x", data("1")).await.unwrap();

        let stat = store.set_data("/x", data("2"), 0).await.unwrap();
        assert_eq!(stat.version, 1);

        let err = store.set_data("/x", data("3"), 0).await.unwrap_err();
        assert!(err.is_version_conflict());
        assert_eq!(store.get_data("/x").await.unwrap().0, data("2"));
    }

    #[tokio::test]
    async fn test_set_data_missing_node() {
        let store = InMemoryCoordinationStore::new();
        let err = store.set_data("/missing", data("1"), 0).await.unwrap_err();
        assert!(err.is_no_node());
    }

    #[tokio::test]
    async fn test_get_children_direct_only() {
        let store = InMemoryCoordinationStore::new();
        store.create("/t/1", data("")).await.unwrap();
        store.create("/t/0/offset", data("5")).await.unwrap();
        store.create("/t/2", data("")).await.unwrap();
        store.create("/t-other/9", data("")).await.unwrap();

        let children = store.get_children("/t").await.unwrap();
        assert_eq!(children, vec!["0", "1", "2"]);
        assert_eq!(store.get_children("/t/0").await.unwrap(), vec!["offset"]);
    }

    #[tokio::test]
    async fn test_get_children_missing_node() {
        let store = InMemoryCoordinationStore::new();
        assert!(store.get_children("/nothing").await.unwrap_err().is_no_node());
    }

    #[tokio::test]
    async fn test_delete_removes_subtree() {
        let store = InMemoryCoordinationStore::new();
        store.create("/s/a/b", data("")).await.unwrap();
        store.create("/s/ab", data("")).await.unwrap();

        store.delete("/s/a").await.unwrap();
        assert!(!store.exists("/s/a").await.unwrap());
        assert!(!store.exists("/s/a/b").await.unwrap());
        assert!(store.exists("/s/ab").await.unwrap());

        assert!(store.delete("/s/a").await.unwrap_err().is_no_node());
    }

    #[tokio::test]
    async fn test_injected_conflicts() {
        let store = InMemoryCoordinationStore::new();
        store.create("/p", data("1")).await.unwrap();
        store.inject_version_conflicts("/p", 2);

        assert!(store.set_data("/p", data("2"), 0).await.unwrap_err().is_version_conflict());
        assert_eq!(store.pending_conflicts("/p"), 1);
        assert!(store.set_data("/p", data("2"), 0).await.unwrap_err().is_version_conflict());
        assert_eq!(store.set_data("/p", data("2"), 0).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = InMemoryCoordinationStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.exists("/a").await,
            Err(CoordinationError::ConnectionLoss(_))
        ));
        store.set_unavailable(false);
        assert!(!store.exists("/a").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_paths_rejected() {
        let store = InMemoryCoordinationStore::new();
        assert!(store.create("relative", data("")).await.is_err());
        assert!(store.create("/trailing/", data("")).await.is_err());
        assert!(store.create("/", data("")).await.is_err());
        assert!(store.get_children("/trailing").await.is_err());
        assert!(!store.exists("/trailing").await.unwrap());
    }
}

//! Subscription cursor management
//!
//! Tracks how far each subscription has consumed every partition of its event
//! types and lets streams move that position forward (commit) or operators
//! move it anywhere (reset).
//!
//! ## Components
//!
//! - [`CursorValidator`]: event type membership, offset shape, read scopes
//! - [`SessionRegistry`]: stream liveness and partition ownership
//! - [`CommitCoordinator`]: per-partition optimistic read-modify-write
//! - [`CursorResetter`]: marker-guarded forced rewrite
//! - [`CursorsService`]: the facade other subsystems call
//!
//! ## Guarantees
//!
//! - A partition's committed offset never moves backwards through a commit,
//!   however commits interleave; only a reset rewinds it.
//! - Commits are accepted only from the stream currently owning the partition.
//! - No application lock is held around the coordination store; concurrent
//!   writers are serialized by its version check alone.

mod catalog;
mod commit;
mod cursor;
mod reset;
mod service;
mod session;
mod storage;
mod subscription;
mod validator;

pub use catalog::{EventTypeStore, InMemoryCatalog, SubscriptionStore, TimelineResolver};
pub use commit::{advance_offsets, Advance, CommitCoordinator, COMMIT_CONFLICT_RETRY_TIMES};
pub use cursor::{Cursor, EventTypePartition, Timeline};
pub use reset::{CursorResetter, RESET_POLL_INTERVAL};
pub use service::{group_by_partition, CursorsService, PartitionBatch};
pub use session::SessionRegistry;
pub use storage::{format_offset, KafkaStorageDriver, StorageDriver, BEGIN_OFFSET};
pub use subscription::{EventType, PartitionAssignment, PartitionState, Subscription};
pub use validator::CursorValidator;

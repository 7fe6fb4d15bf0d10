//! Optimistic offset commits
//!
//! A partition's committed offset is advanced with a read-modify-write cycle
//! against the coordination store:
//!
//! 1. read the stored offset and its version (absent means "unset")
//! 2. walk the batch in order, keeping a running maximum; a cursor commits
//!    only if it is strictly greater than everything before it
//! 3. if the maximum moved, re-check that the stream still owns the
//!    partition and no reset holds the subscription, then write it back
//!    conditioned on the version read
//!
//! The ownership check sits between the read and the write. A reset
//! unassigns partitions before it rewrites offsets, so a commit that read
//! the old version either fails that check or loses the version race and
//! fails it on the next attempt.
//!
//! Losing the version race restarts the cycle, at most
//! [`COMMIT_CONFLICT_RETRY_TIMES`] attempts in total. Every other store
//! failure aborts immediately.

use bytes::Bytes;
use std::cmp::Ordering;
use tracing::{debug, error};

use super::{Cursor, SessionRegistry, StorageDriver};
use crate::coordination::{paths, CoordinationClient};
use crate::error::{Result, StreamlineError, ERROR_COMMUNICATING_WITH_COORDINATION};
use crate::metrics;

/// Attempts one partition commit may take before giving up
pub const COMMIT_CONFLICT_RETRY_TIMES: usize = 5;

/// Outcome of applying a batch to a stored offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Per-cursor result, aligned with the batch
    pub commits: Vec<bool>,
    /// Running maximum after the whole batch
    pub max_offset: Option<String>,
}

impl Advance {
    /// True if at least one cursor moved the offset
    pub fn advanced(&self) -> bool {
        self.commits.iter().any(|committed| *committed)
    }
}

/// Apply a batch of same-partition cursors to `current`
///
/// Ties and regressions never commit. An unset `current` is below any cursor.
pub fn advance_offsets(
    driver: &dyn StorageDriver,
    current: Option<&str>,
    cursors: &[Cursor],
) -> Result<Advance> {
    let mut running = current;
    let mut commits = Vec::with_capacity(cursors.len());

    for cursor in cursors {
        let advances = match running {
            None => true,
            Some(max) => {
                driver
                    .compare_offsets(&cursor.offset, max)
                    .map_err(|e| StreamlineError::invalid_cursor(e, cursor))?
                    == Ordering::Greater
            }
        };
        if advances {
            running = Some(cursor.offset.as_str());
        }
        commits.push(advances);
    }

    Ok(Advance {
        commits,
        max_offset: running.map(str::to_string),
    })
}

/// Runs the bounded read-modify-write loop for one partition
#[derive(Debug, Clone)]
pub struct CommitCoordinator {
    client: CoordinationClient,
    sessions: SessionRegistry,
}

impl CommitCoordinator {
    pub fn new(client: CoordinationClient) -> Self {
        Self {
            sessions: SessionRegistry::new(client.clone()),
            client,
        }
    }

    /// Commit a batch of cursors that all point at the same partition
    ///
    /// Returns one flag per cursor in input order. Fails with
    /// `InvalidStreamId` once `stream_id` loses the partition or a reset
    /// starts, whichever attempt notices it.
    pub async fn commit_partition(
        &self,
        subscription_id: &str,
        stream_id: &str,
        driver: &dyn StorageDriver,
        cursors: &[Cursor],
    ) -> Result<Vec<bool>> {
        let Some(first) = cursors.first() else {
            return Ok(Vec::new());
        };
        let partition = first.event_type_partition();
        let path = paths::offset(subscription_id, first.topic(), &first.partition);

        for attempt in 1..=COMMIT_CONFLICT_RETRY_TIMES {
            let stored = self.client.read_utf8(&path, "read offset").await?;
            let (current, version) = match &stored {
                Some((offset, stat)) => (Some(offset.as_str()), Some(stat.version)),
                None => (None, None),
            };

            let advance = advance_offsets(driver, current, cursors)?;
            let new_offset = match advance.max_offset {
                Some(ref offset) if advance.advanced() => offset.clone(),
                _ => {
                    metrics::record_commit_attempts(subscription_id, attempt);
                    return Ok(advance.commits);
                }
            };

            self.sessions
                .ensure_commit_rights(subscription_id, stream_id, first)
                .await?;

            match self
                .client
                .write_conditional(&path, Bytes::from(new_offset), version)
                .await
            {
                Ok(_) => {
                    metrics::record_commit_attempts(subscription_id, attempt);
                    debug!(
                        subscription_id = %subscription_id,
                        partition = %partition,
                        attempt,
                        "committed {} cursor(s) for partition {}",
                        advance.commits.iter().filter(|c| **c).count(),
                        partition
                    );
                    return Ok(advance.commits);
                }
                Err(e) if e.is_version_conflict() => {
                    metrics::record_commit_conflict(subscription_id);
                    debug!(
                        subscription_id = %subscription_id,
                        partition = %partition,
                        attempt,
                        "Offset changed concurrently, retrying"
                    );
                }
                Err(e) => return Err(CoordinationClient::unavailable("write offset", &e)),
            }
        }

        metrics::record_commit_attempts(subscription_id, COMMIT_CONFLICT_RETRY_TIMES);
        error!(
            subscription_id = %subscription_id,
            partition = %partition,
            attempts = COMMIT_CONFLICT_RETRY_TIMES,
            "Failed to commit offset, too many concurrent writers"
        );
        Err(contended(&partition.to_string()))
    }
}

/// Failure reported once the retry bound is used up
pub(crate) fn contended(what: &str) -> StreamlineError {
    StreamlineError::ServiceUnavailable(format!(
        "{}: {} still contended after {} attempts",
        ERROR_COMMUNICATING_WITH_COORDINATION, what, COMMIT_CONFLICT_RETRY_TIMES
    ))
}

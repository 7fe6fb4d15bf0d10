//! Forced offset rewrite
//!
//! A reset takes the subscription's reset marker, detaches every stream that
//! holds an affected partition, and then overwrites the stored offsets,
//! regressions included. The whole sequence runs against one deadline; the
//! marker is released on every exit path once acquired.

use bytes::Bytes;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

use super::commit::{contended, COMMIT_CONFLICT_RETRY_TIMES};
use super::{Cursor, PartitionAssignment, PartitionState};
use crate::coordination::{paths, CoordinationClient};
use crate::error::{CoordinationError, CursorError, Result, StreamlineError};
use crate::metrics;

/// Delay between attempts to take a reset marker held by someone else
pub const RESET_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct CursorResetter {
    client: CoordinationClient,
}

impl CursorResetter {
    pub fn new(client: CoordinationClient) -> Self {
        Self { client }
    }

    /// Overwrite the offsets of `cursors` within `timeout`
    pub async fn reset(&self, subscription_id: &str, cursors: &[Cursor], timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let marker = paths::cursor_reset(subscription_id);
        let payload = Bytes::from(serde_json::to_vec(cursors)?);

        match timeout_at(deadline, self.acquire_marker(&marker, payload)).await {
            Ok(acquired) => acquired?,
            Err(_) => return Err(Self::timed_out(subscription_id, timeout)),
        }

        let outcome = timeout_at(deadline, self.rewrite(subscription_id, cursors)).await;
        let released = self
            .client
            .delete_if_exists(&marker, "release cursor reset")
            .await;

        match outcome {
            Ok(rewritten) => rewritten?,
            Err(_) => {
                if let Err(e) = released {
                    warn!(subscription_id = %subscription_id, error = %e, "Failed to release cursor reset marker");
                }
                return Err(Self::timed_out(subscription_id, timeout));
            }
        }
        released?;

        metrics::record_cursor_reset(subscription_id, cursors.len());
        info!(
            subscription_id = %subscription_id,
            cursors = cursors.len(),
            "Reset subscription cursors"
        );
        Ok(())
    }

    fn timed_out(subscription_id: &str, timeout: Duration) -> StreamlineError {
        StreamlineError::OperationTimeout(format!(
            "Cursor reset of subscription {} did not finish within {:?}",
            subscription_id, timeout
        ))
    }

    async fn acquire_marker(&self, marker: &str, payload: Bytes) -> Result<()> {
        loop {
            match self.client.create(marker, payload.clone()).await {
                Ok(_) => return Ok(()),
                Err(CoordinationError::NodeExists(_)) => {
                    debug!(marker = %marker, "Cursor reset already in progress, waiting");
                    sleep(RESET_POLL_INTERVAL).await;
                }
                Err(e) => {
                    return Err(CoordinationClient::unavailable("acquire cursor reset", &e))
                }
            }
        }
    }

    async fn rewrite(&self, subscription_id: &str, cursors: &[Cursor]) -> Result<()> {
        for cursor in cursors {
            let path = paths::partition(subscription_id, cursor.topic(), &cursor.partition);
            if !self.client.exists(&path, "check partition").await? {
                return Err(StreamlineError::invalid_cursor(
                    CursorError::PartitionNotFound,
                    cursor,
                ));
            }
        }

        let mut seen = HashSet::new();
        let mut streams = BTreeSet::new();
        for cursor in cursors {
            if seen.insert(cursor.event_type_partition()) {
                streams.extend(self.unassign(subscription_id, cursor).await?);
            }
        }

        for stream_id in &streams {
            debug!(subscription_id = %subscription_id, stream_id = %stream_id, "Disconnecting stream");
            self.client
                .delete_if_exists(&paths::session(subscription_id, stream_id), "delete session")
                .await?;
        }

        for cursor in cursors {
            self.force_offset(subscription_id, cursor).await?;
        }
        Ok(())
    }

    /// Release a partition, returning the streams that held or awaited it
    async fn unassign(&self, subscription_id: &str, cursor: &Cursor) -> Result<Vec<String>> {
        let path = paths::partition(subscription_id, cursor.topic(), &cursor.partition);
        let released = Bytes::from(serde_json::to_vec(&PartitionAssignment::unassigned())?);

        for _ in 0..COMMIT_CONFLICT_RETRY_TIMES {
            let Some((assignment, stat)) = self
                .client
                .read_json::<PartitionAssignment>(&path, "read partition assignment")
                .await?
            else {
                return Ok(Vec::new());
            };

            let streams: Vec<String> = [assignment.session, assignment.next_session]
                .into_iter()
                .filter(|stream| !stream.is_empty())
                .collect();
            if assignment.state == PartitionState::Unassigned && streams.is_empty() {
                return Ok(streams);
            }

            match self
                .client
                .write_conditional(&path, released.clone(), Some(stat.version))
                .await
            {
                Ok(_) => return Ok(streams),
                Err(e) if e.is_version_conflict() => continue,
                Err(e) => {
                    return Err(CoordinationClient::unavailable("write partition assignment", &e))
                }
            }
        }
        Err(contended(&format!("assignment of {}", cursor.event_type_partition())))
    }

    async fn force_offset(&self, subscription_id: &str, cursor: &Cursor) -> Result<()> {
        let path = paths::offset(subscription_id, cursor.topic(), &cursor.partition);

        for _ in 0..COMMIT_CONFLICT_RETRY_TIMES {
            let version = self
                .client
                .read_utf8(&path, "read offset")
                .await?
                .map(|(_, stat)| stat.version);
            match self
                .client
                .write_conditional(&path, Bytes::from(cursor.offset.clone()), version)
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) if e.is_version_conflict() => continue,
                Err(e) => return Err(CoordinationClient::unavailable("write offset", &e)),
            }
        }
        Err(contended(&format!("offset of {}", cursor.event_type_partition())))
    }
}

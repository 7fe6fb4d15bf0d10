//! Session liveness and partition ownership lookups
//!
//! Sessions and assignments are written by the streaming session manager;
//! this registry only reads them (reset is the one exception and lives in
//! [`CursorResetter`](super::CursorResetter)).

use std::collections::HashMap;
use tracing::debug;

use super::{Cursor, EventTypePartition, PartitionAssignment};
use crate::coordination::{paths, CoordinationClient};
use crate::error::{CursorError, Result, StreamlineError};

#[derive(Debug, Clone)]
pub struct SessionRegistry {
    client: CoordinationClient,
}

impl SessionRegistry {
    pub fn new(client: CoordinationClient) -> Self {
        Self { client }
    }

    /// True if `stream_id` has a live session node in the subscription
    pub async fn is_active_session(&self, subscription_id: &str, stream_id: &str) -> Result<bool> {
        self.client
            .exists(&paths::session(subscription_id, stream_id), "check session")
            .await
    }

    /// Current assignment of the partition a cursor points at
    ///
    /// A missing assignment node means the partition is not part of the
    /// subscription and fails with `PartitionNotFound`.
    pub async fn assignment(&self, subscription_id: &str, cursor: &Cursor) -> Result<PartitionAssignment> {
        let path = paths::partition(subscription_id, cursor.topic(), &cursor.partition);
        match self
            .client
            .read_json::<PartitionAssignment>(&path, "read partition assignment")
            .await?
        {
            Some((assignment, _)) => Ok(assignment),
            None => Err(StreamlineError::invalid_cursor(
                CursorError::PartitionNotFound,
                cursor,
            )),
        }
    }

    /// Fail unless `stream_id` is live and owns every partition in `cursors`
    pub async fn validate_stream_ownership(
        &self,
        subscription_id: &str,
        stream_id: &str,
        cursors: &[Cursor],
    ) -> Result<()> {
        if !self.is_active_session(subscription_id, stream_id).await? {
            return Err(StreamlineError::InvalidStreamId(format!(
                "Session with stream id {} not found",
                stream_id
            )));
        }

        let mut owners: HashMap<EventTypePartition, Option<String>> = HashMap::new();
        for cursor in cursors {
            let key = cursor.event_type_partition();
            if !owners.contains_key(&key) {
                let assignment = self.assignment(subscription_id, cursor).await?;
                owners.insert(key.clone(), assignment.owner().map(str::to_string));
            }
            if owners.get(&key).and_then(Option::as_deref) != Some(stream_id) {
                debug!(
                    subscription_id = %subscription_id,
                    stream_id = %stream_id,
                    partition = %key,
                    "Stream does not own partition"
                );
                return Err(StreamlineError::InvalidStreamId(format!(
                    "Cursor {} cannot be committed with stream id {}",
                    cursor, stream_id
                )));
            }
        }
        Ok(())
    }

    /// Fail unless `stream_id` may still write the partition of `cursor`
    ///
    /// Checked right before every offset write: a held reset marker or an
    /// assignment that no longer names the stream rejects the commit.
    pub async fn ensure_commit_rights(
        &self,
        subscription_id: &str,
        stream_id: &str,
        cursor: &Cursor,
    ) -> Result<()> {
        if self
            .client
            .exists(&paths::cursor_reset(subscription_id), "check cursor reset")
            .await?
        {
            debug!(
                subscription_id = %subscription_id,
                stream_id = %stream_id,
                "Commit rejected, cursor reset in progress"
            );
            return Err(StreamlineError::InvalidStreamId(format!(
                "Cursors of subscription {} are being reset, stream id {} is no longer valid",
                subscription_id, stream_id
            )));
        }

        let assignment = self.assignment(subscription_id, cursor).await?;
        if assignment.owner() != Some(stream_id) {
            debug!(
                subscription_id = %subscription_id,
                stream_id = %stream_id,
                partition = %cursor.event_type_partition(),
                "Stream lost partition before offset write"
            );
            return Err(StreamlineError::InvalidStreamId(format!(
                "Cursor {} cannot be committed with stream id {}",
                cursor, stream_id
            )));
        }
        Ok(())
    }
}

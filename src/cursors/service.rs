//! Cursor operations exposed to the rest of the broker

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    CommitCoordinator, Cursor, CursorResetter, CursorValidator, EventTypePartition,
    EventTypeStore, InMemoryCatalog, SessionRegistry, SubscriptionStore, TimelineResolver,
};
use crate::auth::Client;
use crate::config::CursorsConfig;
use crate::coordination::{paths, CoordinationClient, CoordinationStore};
use crate::error::{Result, StreamlineError};
use crate::metrics;

/// Cursors of one partition together with their positions in the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionBatch {
    pub partition: EventTypePartition,
    /// Indices into the original cursor list, ascending
    pub indices: Vec<usize>,
}

/// Group cursors by partition, in order of first appearance
pub fn group_by_partition(cursors: &[Cursor]) -> Vec<PartitionBatch> {
    let mut positions: HashMap<EventTypePartition, usize> = HashMap::new();
    let mut batches: Vec<PartitionBatch> = Vec::new();

    for (index, cursor) in cursors.iter().enumerate() {
        let key = cursor.event_type_partition();
        match positions.get(&key) {
            Some(&batch) => batches[batch].indices.push(index),
            None => {
                positions.insert(key.clone(), batches.len());
                batches.push(PartitionBatch {
                    partition: key,
                    indices: vec![index],
                });
            }
        }
    }
    batches
}

/// Facade over validation, ownership checks, commits, reads and resets
#[derive(Debug, Clone)]
pub struct CursorsService {
    subscriptions: Arc<dyn SubscriptionStore>,
    timelines: Arc<dyn TimelineResolver>,
    validator: CursorValidator,
    sessions: SessionRegistry,
    committer: CommitCoordinator,
    resetter: CursorResetter,
    client: CoordinationClient,
    config: CursorsConfig,
}

impl CursorsService {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        event_types: Arc<dyn EventTypeStore>,
        timelines: Arc<dyn TimelineResolver>,
        config: CursorsConfig,
    ) -> Self {
        let client = CoordinationClient::new(store);
        Self {
            subscriptions,
            validator: CursorValidator::new(event_types, Arc::clone(&timelines)),
            timelines,
            sessions: SessionRegistry::new(client.clone()),
            committer: CommitCoordinator::new(client.clone()),
            resetter: CursorResetter::new(client.clone()),
            client,
            config,
        }
    }

    /// Build a service whose catalogs are all served by one in-memory catalog
    pub fn with_catalog(
        store: Arc<dyn CoordinationStore>,
        catalog: Arc<InMemoryCatalog>,
        config: CursorsConfig,
    ) -> Self {
        Self::new(
            store,
            catalog.clone(),
            catalog.clone(),
            catalog,
            config,
        )
    }

    pub fn config(&self) -> &CursorsConfig {
        &self.config
    }

    /// Commit cursors on behalf of a stream
    ///
    /// Returns one flag per input cursor, index-aligned: `true` if that cursor
    /// advanced its partition's offset. Everything is validated before the
    /// first write. Partitions are then committed one after another and the
    /// first failure aborts the call; partitions already committed stay
    /// committed.
    pub async fn commit_cursors(
        &self,
        stream_id: &str,
        subscription_id: &str,
        cursors: &[Cursor],
        client: &dyn Client,
    ) -> Result<Vec<bool>> {
        let subscription = self.subscriptions.get_subscription(subscription_id).await?;
        self.validator.validate_batch(&subscription, cursors).await?;
        self.validator.validate_read_scopes(&subscription, client).await?;
        self.sessions
            .validate_stream_ownership(subscription_id, stream_id, cursors)
            .await?;
        debug!(
            subscription_id = %subscription_id,
            stream_id = %stream_id,
            "[COMMIT_CURSORS] validated {} cursor(s)",
            cursors.len()
        );

        let mut results = vec![false; cursors.len()];
        for batch in group_by_partition(cursors) {
            let group: Vec<Cursor> = batch.indices.iter().map(|&i| cursors[i].clone()).collect();
            let Some(first) = group.first() else {
                continue;
            };
            let driver = self.timelines.storage_driver(&first.timeline).await?;
            let committed = self
                .committer
                .commit_partition(subscription_id, stream_id, driver.as_ref(), &group)
                .await?;
            for (&index, flag) in batch.indices.iter().zip(committed) {
                results[index] = flag;
            }
        }

        let committed = results.iter().filter(|flag| **flag).count();
        metrics::record_cursor_commits(subscription_id, committed, results.len() - committed);
        debug!(
            subscription_id = %subscription_id,
            stream_id = %stream_id,
            committed,
            "[COMMIT_CURSORS] finished committing {} cursor(s)",
            results.len()
        );
        Ok(results)
    }

    /// Committed position of every partition of the subscription
    ///
    /// Event types are visited in name order, partitions in store order. An
    /// event type that never had a commit contributes nothing.
    pub async fn get_subscription_cursors(
        &self,
        subscription_id: &str,
        client: &dyn Client,
    ) -> Result<Vec<Cursor>> {
        let subscription = self.subscriptions.get_subscription(subscription_id).await?;
        self.validator.validate_read_scopes(&subscription, client).await?;

        let mut cursors = Vec::new();
        for event_type in &subscription.event_types {
            let timeline = self.timelines.get_timeline(event_type).await?;
            let driver = self.timelines.storage_driver(&timeline).await?;
            let root = paths::partitions(subscription_id, &timeline.topic);

            let Some(partitions) = self.client.children(&root, "list partitions").await? else {
                debug!(
                    subscription_id = %subscription_id,
                    event_type = %event_type,
                    "No partitions recorded for event type"
                );
                continue;
            };

            for partition in partitions {
                let path = paths::offset(subscription_id, &timeline.topic, &partition);
                let offset = match self.client.read_utf8(&path, "read offset").await? {
                    Some((offset, _)) => offset,
                    None => driver.beginning_offset(),
                };
                cursors.push(Cursor::new(timeline.clone(), partition, offset));
            }
        }
        Ok(cursors)
    }

    /// Force the subscription's offsets to `cursors`
    ///
    /// Streams holding an affected partition are detached. Bounded by the
    /// commit timeout plus a fixed grace period.
    pub async fn reset_cursors(
        &self,
        subscription_id: &str,
        cursors: &[Cursor],
        client: &dyn Client,
    ) -> Result<()> {
        if cursors.is_empty() {
            return Err(StreamlineError::UnableToProcess("Cursors are absent".to_string()));
        }

        let subscription = self.subscriptions.get_subscription(subscription_id).await?;
        self.validator.validate_batch(&subscription, cursors).await?;
        self.validator.validate_read_scopes(&subscription, client).await?;

        info!(
            subscription_id = %subscription_id,
            client_id = %client.client_id(),
            cursors = cursors.len(),
            "Resetting subscription cursors"
        );
        self.resetter
            .reset(subscription_id, cursors, self.config.reset_timeout())
            .await
    }
}

//! Batch-level cursor checks run before anything is written

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::{Cursor, EventTypeStore, StorageDriver, Subscription, TimelineResolver};
use crate::auth::Client;
use crate::error::{Result, StreamlineError};

/// Checks cursor membership, offset shape and read scopes
#[derive(Debug, Clone)]
pub struct CursorValidator {
    event_types: Arc<dyn EventTypeStore>,
    timelines: Arc<dyn TimelineResolver>,
}

impl CursorValidator {
    pub fn new(event_types: Arc<dyn EventTypeStore>, timelines: Arc<dyn TimelineResolver>) -> Self {
        Self {
            event_types,
            timelines,
        }
    }

    /// Validate a whole batch against a subscription
    ///
    /// Every foreign event type is reported at once. Offsets are then handed to
    /// the driver of each cursor's storage; its rejection fails the batch as
    /// `UnableToProcess`.
    pub async fn validate_batch(&self, subscription: &Subscription, cursors: &[Cursor]) -> Result<()> {
        let foreign: BTreeSet<&str> = cursors
            .iter()
            .map(Cursor::event_type)
            .filter(|event_type| !subscription.contains_event_type(event_type))
            .collect();
        if !foreign.is_empty() {
            return Err(StreamlineError::UnableToProcess(format!(
                "Event type does not belong to subscription {}: {}",
                subscription.id,
                foreign.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        let mut drivers: HashMap<&str, Arc<dyn StorageDriver>> = HashMap::new();
        for cursor in cursors {
            let storage_id = cursor.timeline.storage_id.as_str();
            let driver = match drivers.get(storage_id) {
                Some(driver) => Arc::clone(driver),
                None => {
                    let driver = self.timelines.storage_driver(&cursor.timeline).await?;
                    drivers.insert(storage_id, Arc::clone(&driver));
                    driver
                }
            };
            driver.validate_commit_cursor(cursor).map_err(|e| {
                StreamlineError::UnableToProcess(format!("Invalid cursor {}: {}", cursor, e))
            })?;
        }

        debug!(
            subscription_id = %subscription.id,
            "[COMMIT_CURSORS] finished validation of {} cursor(s)",
            cursors.len()
        );
        Ok(())
    }

    /// Check the client may read every event type of the subscription
    ///
    /// Stops at the first event type the client is not allowed to read.
    pub async fn validate_read_scopes(&self, subscription: &Subscription, client: &dyn Client) -> Result<()> {
        for name in &subscription.event_types {
            let event_type = self.event_types.find_by_name(name).await?;
            client.check_scopes(&event_type.read_scopes)?;
        }
        debug!(
            subscription_id = %subscription.id,
            client_id = %client.client_id(),
            "[COMMIT_CURSORS] read scopes granted"
        );
        Ok(())
    }
}

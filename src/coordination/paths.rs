//! Node layout for subscription bookkeeping
//!
//! ```text
//! /nakadi/subscriptions/{subscription}/topics/{topic}                       partitions root
//! /nakadi/subscriptions/{subscription}/topics/{topic}/{partition}           assignment record
//! /nakadi/subscriptions/{subscription}/topics/{topic}/{partition}/offset    committed offset
//! /nakadi/subscriptions/{subscription}/sessions/{stream}                    live session
//! /nakadi/subscriptions/{subscription}/cursor_reset                         reset in progress
//! ```

/// Root under which every subscription keeps its nodes
pub const SUBSCRIPTIONS_ROOT: &str = "/nakadi/subscriptions";

/// Committed offset of one partition
pub fn offset(subscription_id: &str, topic: &str, partition: &str) -> String {
    format!(
        "{}/{}/topics/{}/{}/offset",
        SUBSCRIPTIONS_ROOT, subscription_id, topic, partition
    )
}

/// Assignment record of one partition
pub fn partition(subscription_id: &str, topic: &str, partition: &str) -> String {
    format!(
        "{}/{}/topics/{}/{}",
        SUBSCRIPTIONS_ROOT, subscription_id, topic, partition
    )
}

/// Container holding every partition of a topic
pub fn partitions(subscription_id: &str, topic: &str) -> String {
    format!("{}/{}/topics/{}", SUBSCRIPTIONS_ROOT, subscription_id, topic)
}

/// Liveness node of one stream
pub fn session(subscription_id: &str, stream_id: &str) -> String {
    format!(
        "{}/{}/sessions/{}",
        SUBSCRIPTIONS_ROOT, subscription_id, stream_id
    )
}

/// Marker held while a reset rewrites offsets
pub fn cursor_reset(subscription_id: &str) -> String {
    format!("{}/{}/cursor_reset", SUBSCRIPTIONS_ROOT, subscription_id)
}

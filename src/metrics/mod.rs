//! Metrics for cursor coordination
//!
//! Counters and histograms are emitted through the `metrics` facade; the
//! embedding process installs whatever recorder it exports with.
//!
//! When the `metrics` feature is disabled, all functions become no-ops,
//! keeping the same API surface.

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Register descriptions for every cursor metric
#[cfg(feature = "metrics")]
pub fn describe_metrics() {
    describe_counter!(
        "streamline_cursor_commit_conflicts_total",
        "Conditional offset writes that lost a version race"
    );
    describe_histogram!(
        "streamline_cursor_commit_attempts",
        "Read-modify-write attempts needed to settle one partition commit"
    );
    describe_counter!(
        "streamline_cursor_commits_total",
        "Cursors submitted for commit, labelled by outcome"
    );
    describe_counter!(
        "streamline_cursor_resets_total",
        "Cursors force-written by a reset"
    );
}

/// Record a lost version race on a partition offset
#[cfg(feature = "metrics")]
pub fn record_commit_conflict(subscription_id: &str) {
    counter!(
        "streamline_cursor_commit_conflicts_total",
        "subscription" => subscription_id.to_string()
    )
    .increment(1);
}

/// Record how many attempts one partition commit took
#[cfg(feature = "metrics")]
pub fn record_commit_attempts(subscription_id: &str, attempts: usize) {
    histogram!(
        "streamline_cursor_commit_attempts",
        "subscription" => subscription_id.to_string()
    )
    .record(attempts as f64);
}

/// Record per-cursor commit outcomes of one call
#[cfg(feature = "metrics")]
pub fn record_cursor_commits(subscription_id: &str, committed: usize, skipped: usize) {
    counter!(
        "streamline_cursor_commits_total",
        "subscription" => subscription_id.to_string(),
        "outcome" => "committed"
    )
    .increment(committed as u64);
    counter!(
        "streamline_cursor_commits_total",
        "subscription" => subscription_id.to_string(),
        "outcome" => "skipped"
    )
    .increment(skipped as u64);
}

/// Record cursors rewritten by a reset
#[cfg(feature = "metrics")]
pub fn record_cursor_reset(subscription_id: &str, cursors: usize) {
    counter!(
        "streamline_cursor_resets_total",
        "subscription" => subscription_id.to_string()
    )
    .increment(cursors as u64);
}

// ============================================================================
// No-op stubs (metrics feature disabled)
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn describe_metrics() {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_commit_conflict(_subscription_id: &str) {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_commit_attempts(_subscription_id: &str, _attempts: usize) {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cursor_commits(_subscription_id: &str, _committed: usize, _skipped: usize) {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cursor_reset(_subscription_id: &str, _cursors: usize) {}

#[cfg(test)]
mod tests {
    use super::*;

    // Without an installed recorder every call is a no-op; this only checks
    // the functions are callable from any thread.
    #[test]
    fn test_record_without_recorder() {
        describe_metrics();
        record_commit_conflict("sub-1");
        record_commit_attempts("sub-1", 3);
        record_cursor_commits("sub-1", 2, 1);
        record_cursor_reset("sub-1", 4);
    }
}

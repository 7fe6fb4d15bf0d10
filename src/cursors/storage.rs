//! Per-storage cursor semantics
//!
//! Offsets are opaque strings to the cursor layer. Each storage backend
//! supplies a [`StorageDriver`] that knows how its offsets are ordered and
//! which of them are acceptable for a commit.

use std::cmp::Ordering;
use std::fmt::Debug;

use super::Cursor;
use crate::error::CursorError;

/// Offset semantics of one storage backend
pub trait StorageDriver: Send + Sync + Debug {
    /// Order two offsets of the same partition
    fn compare_offsets(&self, a: &str, b: &str) -> Result<Ordering, CursorError>;

    /// Reject cursors that can never be committed
    fn validate_commit_cursor(&self, cursor: &Cursor) -> Result<(), CursorError>;

    /// Offset reported for a partition nobody has committed to yet
    fn beginning_offset(&self) -> String;
}

/// Offset literal placed before the first event of a partition
pub const BEGIN_OFFSET: &str = "BEGIN";

const BEGIN_POSITION: i64 = -1;
const OFFSET_WIDTH: usize = 18;

/// Render a numeric Kafka offset in its canonical zero-padded form
pub fn format_offset(offset: i64) -> String {
    if offset < 0 {
        BEGIN_OFFSET.to_string()
    } else {
        format!("{:0width$}", offset, width = OFFSET_WIDTH)
    }
}

/// Driver for Kafka-backed timelines
///
/// Offsets are decimal integers, conventionally zero-padded to 18 digits.
/// `BEGIN` is equivalent to `-1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KafkaStorageDriver;

impl KafkaStorageDriver {
    pub fn new() -> Self {
        Self
    }

    fn position(offset: &str) -> Result<i64, CursorError> {
        if offset.is_empty() {
            return Err(CursorError::NullOffset);
        }
        if offset == BEGIN_OFFSET {
            return Ok(BEGIN_POSITION);
        }
        let position: i64 = offset.parse().map_err(|_| CursorError::InvalidFormat)?;
        if position < BEGIN_POSITION {
            return Err(CursorError::Unavailable);
        }
        Ok(position)
    }
}

impl StorageDriver for KafkaStorageDriver {
    fn compare_offsets(&self, a: &str, b: &str) -> Result<Ordering, CursorError> {
        Ok(Self::position(a)?.cmp(&Self::position(b)?))
    }

    fn validate_commit_cursor(&self, cursor: &Cursor) -> Result<(), CursorError> {
        if cursor.partition.is_empty() {
            return Err(CursorError::NullPartition);
        }
        Self::position(&cursor.offset).map(|_| ())
    }

    fn beginning_offset(&self) -> String {
        BEGIN_OFFSET.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursors::Timeline;

    fn cursor(partition: &str, offset: &str) -> Cursor {
        Cursor::new(Timeline::new("orders", "orders-topic", "kafka"), partition, offset)
    }

    #[test]
    fn test_compare_is_numeric() {
        let driver = KafkaStorageDriver::new();
        assert_eq!(driver.compare_offsets("9", "10").unwrap(), Ordering::Less);
        assert_eq!(
            driver
                .compare_offsets("000000000000000010", "10")
                .unwrap(),
            Ordering::Equal
        );
        assert_eq!(driver.compare_offsets("BEGIN", "0").unwrap(), Ordering::Less);
        assert_eq!(driver.compare_offsets("BEGIN", "-1").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_compare_rejects_garbage() {
        let driver = KafkaStorageDriver::new();
        assert_eq!(
            driver.compare_offsets("abc", "1"),
            Err(CursorError::InvalidFormat)
        );
    }

    #[test]
    fn test_validate_commit_cursor() {
        let driver = KafkaStorageDriver::new();
        assert!(driver.validate_commit_cursor(&cursor("0", "000000000000000042")).is_ok());
        assert!(driver.validate_commit_cursor(&cursor("0", "BEGIN")).is_ok());
        assert_eq!(
            driver.validate_commit_cursor(&cursor("0", "")),
            Err(CursorError::NullOffset)
        );
        assert_eq!(
            driver.validate_commit_cursor(&cursor("", "1")),
            Err(CursorError::NullPartition)
        );
        assert_eq!(
            driver.validate_commit_cursor(&cursor("0", "12x")),
            Err(CursorError::InvalidFormat)
        );
        assert_eq!(
            driver.validate_commit_cursor(&cursor("0", "-5")),
            Err(CursorError::Unavailable)
        );
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(42), "000000000000000042");
        assert_eq!(format_offset(-1), BEGIN_OFFSET);
        assert_eq!(KafkaStorageDriver::new().beginning_offset(), BEGIN_OFFSET);
    }
}

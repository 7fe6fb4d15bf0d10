//! Concurrent commit behaviour

mod common;

use common::*;
use std::cmp::Ordering;
use std::sync::Arc;
use streamline_cursors::cursors::KafkaStorageDriver;
use streamline_cursors::StorageDriver;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_never_regress() {
    let fixture = Arc::new(Fixture::new());
    fixture.stream_owning_orders(STREAM_A, &["0"]).await;

    let mut handles = Vec::new();
    for writer in 0..8u64 {
        let fixture = Arc::clone(&fixture);
        handles.push(tokio::spawn(async move {
            let mut committed = Vec::new();
            for step in 0..20u64 {
                // interleaved, partly decreasing offsets per writer
                let offset = ((step * 7 + writer * 13) % 50).to_string();
                match fixture
                    .service
                    .commit_cursors(STREAM_A, SUBSCRIPTION, &[orders("0", &offset)], &reader())
                    .await
                {
                    Ok(result) if result[0] => committed.push(offset),
                    Ok(_) => {}
                    // contended past the retry bound; nothing was written
                    Err(e) => assert!(e.is_retriable(), "unexpected error {:?}", e),
                }
            }
            committed
        }));
    }

    let mut committed = Vec::new();
    for handle in handles {
        committed.extend(handle.await.unwrap());
    }

    let driver = KafkaStorageDriver::new();
    let stored = fixture.stored_offset(ORDERS_TOPIC, "0").await.unwrap();
    assert!(!committed.is_empty());
    for offset in &committed {
        assert_ne!(
            driver.compare_offsets(&stored, offset).unwrap(),
            Ordering::Less,
            "stored {} is behind committed {}",
            stored,
            offset
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_distinct_partitions_commit_independently() {
    let fixture = Arc::new(Fixture::new());
    fixture.stream_owning_orders(STREAM_A, &["0"]).await;
    fixture.stream_owning_orders(STREAM_B, &["1"]).await;

    let tasks = [(STREAM_A, "0"), (STREAM_B, "1")].map(|(stream, partition)| {
        let fixture = Arc::clone(&fixture);
        tokio::spawn(async move {
            for offset in 1..=50u64 {
                let result = fixture
                    .service
                    .commit_cursors(
                        stream,
                        SUBSCRIPTION,
                        &[orders(partition, &offset.to_string())],
                        &reader(),
                    )
                    .await
                    .unwrap();
                assert_eq!(result, vec![true]);
            }
        })
    });

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(fixture.stored_offset(ORDERS_TOPIC, "0").await.as_deref(), Some("50"));
    assert_eq!(fixture.stored_offset(ORDERS_TOPIC, "1").await.as_deref(), Some("50"));
}

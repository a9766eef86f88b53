// tests/batcher.rs

mod common;
use crate::common::{fake_source, init_tracing, TestResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{sleep, timeout};

use devwatch::types::ChangeKind;
use devwatch::watch::{EventBatcher, RawEvent, BATCH_INTERVAL};

#[tokio::test(start_paused = true)]
async fn burst_inside_one_window_is_one_batch_in_arrival_order() -> TestResult {
    init_tracing();
    let (source, streams, handle) = fake_source();
    let mut batcher = EventBatcher::spawn(source, streams.events);

    handle.write("./a.go");
    handle.emit("./b.go", ChangeKind::Created);
    handle.write("./a.go");

    let batch = batcher.next_batch().await.ok_or("batcher stopped")?;
    assert_eq!(
        batch,
        vec![
            RawEvent::new("./a.go", ChangeKind::Written),
            RawEvent::new("./b.go", ChangeKind::Created),
            RawEvent::new("./a.go", ChangeKind::Written),
        ]
    );

    batcher.close().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn quiet_windows_produce_no_batch() -> TestResult {
    let (source, streams, _handle) = fake_source();
    let mut batcher = EventBatcher::spawn(source, streams.events);

    let waited = timeout(BATCH_INTERVAL * 10, batcher.next_batch()).await;
    assert!(waited.is_err(), "expected no batch, got {waited:?}");

    batcher.close().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn events_in_different_windows_are_separate_batches() -> TestResult {
    let (source, streams, handle) = fake_source();
    let mut batcher = EventBatcher::spawn(source, streams.events);

    handle.write("./first.go");
    sleep(BATCH_INTERVAL + BATCH_INTERVAL / 2).await;
    handle.write("./second.go");

    let first = batcher.next_batch().await.ok_or("batcher stopped")?;
    let second = batcher.next_batch().await.ok_or("batcher stopped")?;

    assert_eq!(first, vec![RawEvent::new("./first.go", ChangeKind::Written)]);
    assert_eq!(second, vec![RawEvent::new("./second.go", ChangeKind::Written)]);

    batcher.close().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn custom_window_delays_the_batch() -> TestResult {
    let (source, streams, handle) = fake_source();
    let window = Duration::from_millis(400);
    let mut batcher = EventBatcher::with_interval(source, streams.events, window);

    handle.write("./slow.go");

    assert!(timeout(Duration::from_millis(300), batcher.next_batch()).await.is_err());
    let batch = batcher.next_batch().await.ok_or("batcher stopped")?;
    assert_eq!(batch.len(), 1);

    batcher.close().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn pending_events_survive_the_end_of_the_stream() -> TestResult {
    let (source, streams, handle) = fake_source();
    let mut batcher = EventBatcher::spawn(source, streams.events);

    handle.write("./last.go");
    drop(handle);

    let batch = batcher.next_batch().await.ok_or("batcher stopped")?;
    assert_eq!(batch, vec![RawEvent::new("./last.go", ChangeKind::Written)]);

    batcher.close().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn close_releases_the_source() -> TestResult {
    let (source, streams, handle) = fake_source();
    let batcher = EventBatcher::spawn(source, streams.events);

    handle.write("./never-delivered.go");
    assert!(!handle.is_closed());

    batcher.close().await;
    assert!(handle.is_closed());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dropping_the_batcher_releases_the_source() -> TestResult {
    let (source, streams, handle) = fake_source();
    let batcher = EventBatcher::spawn(source, streams.events);

    drop(batcher);
    sleep(BATCH_INTERVAL).await;

    assert!(handle.is_closed());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn close_does_not_wait_for_an_unread_batch() -> TestResult {
    let (source, streams, handle) = fake_source();
    let batcher = EventBatcher::spawn(source, streams.events);

    // Fill the one-slot channel and leave a second batch blocked on send.
    handle.write("./one.go");
    sleep(BATCH_INTERVAL * 2).await;
    handle.write("./two.go");
    sleep(BATCH_INTERVAL * 2).await;

    timeout(Duration::from_secs(1), batcher.close()).await?;
    assert!(handle.is_closed());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn continuous_event_stream_still_yields_batches_every_window() -> TestResult {
    init_tracing();
    let (source, streams, handle) = fake_source();
    let mut batcher = EventBatcher::spawn(source, streams.events);

    // Producer on a plain thread, like notify's callback thread.
    let running = Arc::new(AtomicBool::new(true));
    let producer = {
        let running = Arc::clone(&running);
        let events = handle.events.clone();
        std::thread::spawn(move || {
            let mut n = 0u64;
            while running.load(Ordering::Relaxed) {
                let _ = events.send(RawEvent::new(format!("./f{n}.go"), ChangeKind::Written));
                n += 1;
                if n % 64 == 0 {
                    std::thread::sleep(Duration::from_micros(200));
                }
            }
        })
    };

    let mut received = 0;
    let result = timeout(BATCH_INTERVAL * 20, async {
        while received < 3 {
            match batcher.next_batch().await {
                Some(batch) => {
                    assert!(!batch.is_empty());
                    received += 1;
                }
                None => break,
            }
        }
    })
    .await;

    running.store(false, Ordering::Relaxed);
    producer.join().map_err(|_| "producer thread panicked")?;

    assert!(result.is_ok(), "only {received} batches while events kept arriving");
    assert_eq!(received, 3);

    batcher.close().await;
    Ok(())
}

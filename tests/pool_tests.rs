//! Behavior tests for the adaptive worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use scurry::pool::{FeedbackConfig, WorkerPool};

/// 1000 no-op jobs on a fixed pool: every job counted, worker count stable.
#[test]
fn fixed_pool_completes_all_jobs() {
    let pool = WorkerPool::new(4, 100, false).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let counter_clone = counter.clone();
    pool.submit_all(
        move |_: u32| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        },
        0u32..1000,
    )
    .unwrap();
    pool.wait_all();

    assert_eq!(counter.load(Ordering::SeqCst), 1000);
    assert_eq!(pool.completed_count(), 1000);
    assert_eq!(pool.worker_count(), 4);
    pool.shutdown().unwrap();
}

/// wait_all must not return before a sleeping job has actually finished.
#[test]
fn wait_all_blocks_until_job_finishes() {
    let pool = WorkerPool::new(1, 10, false).unwrap();
    let start = Instant::now();

    pool.submit(
        |_: ()| {
            std::thread::sleep(Duration::from_millis(50));
        },
        (),
    )
    .unwrap();
    pool.wait_all();

    assert!(
        start.elapsed() >= Duration::from_millis(45),
        "wait_all returned after {:?}",
        start.elapsed()
    );
    pool.shutdown().unwrap();
}

/// Initial worker count above the capacity bound is a construction error.
#[test]
fn oversized_initial_count_fails_construction() {
    let result = WorkerPool::<String>::new(20, 10, false);
    assert!(result.is_err());
    assert!(
        result
            .err()
            .unwrap()
            .to_string()
            .contains("exceeds capacity bound")
    );
}

/// Submission blocks under backpressure once the queue is full.
#[test]
fn submit_blocks_when_queue_is_full() {
    let pool = WorkerPool::new(1, 2, false).unwrap();

    // First job occupies the single worker.
    pool.submit(
        |_: u8| {
            std::thread::sleep(Duration::from_millis(150));
        },
        0,
    )
    .unwrap();
    std::thread::sleep(Duration::from_millis(30));

    // Fill the queue, then the next submit must wait for a free slot.
    pool.submit(|_: u8| {}, 1).unwrap();
    pool.submit(|_: u8| {}, 2).unwrap();

    let start = Instant::now();
    pool.submit(|_: u8| {}, 3).unwrap();
    assert!(
        start.elapsed() >= Duration::from_millis(60),
        "submit returned after {:?} with a full queue",
        start.elapsed()
    );

    pool.wait_all();
    pool.shutdown().unwrap();
}

/// Under a load burst that ramps up and then stops, the feedback controller
/// grows the worker set, later shrinks it, and never exceeds the capacity
/// bound.
#[test]
fn feedback_grows_then_shrinks_within_capacity() {
    let config = FeedbackConfig {
        window: Duration::from_millis(400),
        telemetry_interval: Duration::from_millis(100),
        growth_gain: 2.0,
        shrink_fraction: 0.5,
    };
    let pool = WorkerPool::with_config(2, 100, true, config).unwrap();

    let mut samples = Vec::new();
    std::thread::scope(|s| {
        // Rate-limited feeder: roughly 20 submissions per second for 1.2s,
        // each job holding a worker for 150ms.
        s.spawn(|| {
            for i in 0u32..24 {
                pool.submit(
                    |_: u32| {
                        std::thread::sleep(Duration::from_millis(150));
                    },
                    i,
                )
                .unwrap();
                std::thread::sleep(Duration::from_millis(50));
            }
        });

        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(2800) {
            samples.push(pool.worker_count());
            std::thread::sleep(Duration::from_millis(50));
        }
    });
    pool.wait_all();

    let peak = *samples.iter().max().unwrap();
    let last = *samples.last().unwrap();
    assert!(samples.iter().all(|&count| count <= 100));
    assert!(peak > 2, "worker count should rise under load, peak was {peak}");
    assert!(
        last < peak,
        "worker count should shrink after the burst, last {last} vs peak {peak}"
    );
    assert!(last >= 1);

    pool.shutdown().unwrap();
}

/// With feedback enabled the worker count stays under the capacity bound
/// even when the queue is hammered with fast jobs.
#[test]
fn feedback_never_exceeds_capacity_bound() {
    let config = FeedbackConfig {
        window: Duration::from_millis(200),
        telemetry_interval: Duration::from_millis(100),
        growth_gain: 4.0,
        shrink_fraction: 0.5,
    };
    let pool = WorkerPool::with_config(2, 5, true, config).unwrap();

    let mut samples = Vec::new();
    std::thread::scope(|s| {
        s.spawn(|| {
            pool.submit_all(|_: u32| {}, 0u32..2000).unwrap();
        });
        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(1200) {
            samples.push(pool.worker_count());
            std::thread::sleep(Duration::from_millis(20));
        }
    });
    pool.wait_all();

    assert_eq!(pool.completed_count(), 2000);
    assert!(
        samples.iter().all(|&count| count <= 5),
        "worker count exceeded capacity: {samples:?}"
    );
    pool.shutdown().unwrap();
}

/// With feedback disabled the worker count never moves, whatever the load.
#[test]
fn disabled_feedback_keeps_worker_count_constant() {
    let pool = WorkerPool::new(3, 50, false).unwrap();

    pool.submit_all(|_: u32| {}, 0u32..500).unwrap();
    let mid = pool.worker_count();
    pool.wait_all();

    assert_eq!(mid, 3);
    assert_eq!(pool.worker_count(), 3);
    pool.shutdown().unwrap();
}

/// Submitting concurrently from several threads loses and duplicates
/// nothing.
#[test]
fn concurrent_submitters_are_counted_exactly() {
    let pool = WorkerPool::new(4, 64, false).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|s| {
        for _ in 0..8 {
            let counter = counter.clone();
            let pool = &pool;
            s.spawn(move || {
                for _ in 0..25 {
                    let counter = counter.clone();
                    pool.submit(
                        move |_: ()| {
                            counter.fetch_add(1, Ordering::SeqCst);
                        },
                        (),
                    )
                    .unwrap();
                }
            });
        }
    });
    pool.wait_all();

    assert_eq!(counter.load(Ordering::SeqCst), 200);
    assert_eq!(pool.completed_count(), 200);
    pool.shutdown().unwrap();
}

/// After shutdown the queue is drained: no queued job is lost.
#[test]
fn shutdown_drains_queued_jobs() {
    let pool = WorkerPool::new(2, 128, false).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let counter_clone = counter.clone();
    pool.submit_all(
        move |_: u32| {
            std::thread::sleep(Duration::from_millis(2));
            counter_clone.fetch_add(1, Ordering::SeqCst);
        },
        0u32..100,
    )
    .unwrap();
    pool.shutdown().unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 100);
}

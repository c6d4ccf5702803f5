use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossbeam::channel::{Receiver, Sender, bounded};
use tracing::{debug, warn};

use super::feedback::{self, ControllerHandle, FeedbackConfig};
use super::job::{Job, JobAction};
use super::latch::CompletionLatch;
use super::worker::WorkerHandle;

/// Worker registry: one slot per possible worker, indexed `0..capacity`.
///
/// Grow fills the lowest free slots; shrink retires the highest-indexed
/// active workers. A retired worker's slot stays free until a later grow
/// reuses it, so slot indices are stable worker identifiers.
struct Registry {
    slots: Vec<Option<WorkerHandle>>,
    /// Retired workers that may still be finishing their last job; joined
    /// at shutdown.
    retired: Vec<WorkerHandle>,
    /// The worker count the pool currently wants active.
    target: usize,
}

/// State shared between the pool handle, its workers, and the feedback
/// controller.
pub(crate) struct PoolShared<P: Send + 'static> {
    capacity: usize,
    job_rx: Receiver<Job<P>>,
    completed: AtomicU64,
    latch: CompletionLatch,
    accepting: AtomicBool,
    registry: Mutex<Registry>,
    started: Instant,
}

impl<P: Send + 'static> PoolShared<P> {
    pub(crate) fn jobs(&self) -> &Receiver<Job<P>> {
        &self.job_rx
    }

    /// Called by a worker after running a job: bump the monotonic counter
    /// and release one unit of outstanding work.
    pub(crate) fn record_completion(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
        self.latch.count_down();
    }

    pub(crate) fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn worker_count(&self) -> usize {
        let reg = self.registry.lock().unwrap();
        reg.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub(crate) fn worker_target(&self) -> usize {
        self.registry.lock().unwrap().target
    }

    /// Grow or shrink the active worker set towards `new_target`.
    ///
    /// The target is clamped to the capacity bound; an out-of-range request
    /// is a recoverable correction, not an error. Spawn failures shrink the
    /// recorded target so it always matches the occupied slots.
    pub(crate) fn set_worker_target(self: &Arc<Self>, new_target: usize) -> Result<()> {
        let new_target = new_target.min(self.capacity);
        let mut reg = self.registry.lock().unwrap();
        let current = reg.target;

        if new_target > current {
            let mut remaining = new_target - current;
            for slot in 0..self.capacity {
                if remaining == 0 {
                    break;
                }
                if reg.slots[slot].is_none() {
                    match WorkerHandle::spawn(slot, self.clone()) {
                        Ok(handle) => {
                            reg.slots[slot] = Some(handle);
                            remaining -= 1;
                        }
                        Err(e) => {
                            reg.target = new_target - remaining;
                            return Err(e).context("failed to spawn worker thread");
                        }
                    }
                }
            }
            reg.target = new_target - remaining;
            debug!(from = current, to = reg.target, "grew worker set");
        } else if new_target < current {
            let mut remaining = current - new_target;
            for slot in (0..self.capacity).rev() {
                if remaining == 0 {
                    break;
                }
                if let Some(handle) = reg.slots[slot].take() {
                    handle.retire();
                    reg.retired.push(handle);
                    remaining -= 1;
                }
            }
            reg.target = new_target;
            debug!(from = current, to = new_target, "shrank worker set");
        }

        Ok(())
    }
}

/// Point-in-time observability snapshot. Advisory only; the feedback
/// controller makes its decisions from its own windowed samples.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub elapsed: Duration,
    pub completed: u64,
    pub workers: usize,
    /// Completed jobs per second, averaged over the pool's lifetime.
    pub average_speed: f64,
}

/// Bounded-concurrency pool of worker threads with optional throughput
/// feedback control.
///
/// The job queue doubles as the backpressure mechanism: [`WorkerPool::submit`]
/// blocks its caller whenever `capacity_bound` jobs are already queued.
pub struct WorkerPool<P: Send + 'static> {
    shared: Arc<PoolShared<P>>,
    job_tx: Option<Sender<Job<P>>>,
    controller: Option<ControllerHandle>,
}

impl<P: Send + 'static> WorkerPool<P> {
    /// Create a pool with `initial_workers` active workers and a hard
    /// ceiling of `capacity_bound` on both the queue length and the worker
    /// count. Fails fast, spawning nothing, when the initial count exceeds
    /// the bound.
    pub fn new(
        initial_workers: usize,
        capacity_bound: usize,
        feedback_enabled: bool,
    ) -> Result<Self> {
        Self::with_config(
            initial_workers,
            capacity_bound,
            feedback_enabled,
            FeedbackConfig::default(),
        )
    }

    /// Like [`WorkerPool::new`] with explicit feedback controller tuning.
    pub fn with_config(
        initial_workers: usize,
        capacity_bound: usize,
        feedback_enabled: bool,
        feedback: FeedbackConfig,
    ) -> Result<Self> {
        if capacity_bound == 0 {
            bail!("capacity bound must be at least 1");
        }
        if initial_workers > capacity_bound {
            bail!(
                "initial worker count {} exceeds capacity bound {}",
                initial_workers,
                capacity_bound
            );
        }

        let (job_tx, job_rx) = bounded(capacity_bound);
        let shared = Arc::new(PoolShared {
            capacity: capacity_bound,
            job_rx,
            completed: AtomicU64::new(0),
            latch: CompletionLatch::new(),
            accepting: AtomicBool::new(true),
            registry: Mutex::new(Registry {
                slots: (0..capacity_bound).map(|_| None).collect(),
                retired: Vec::new(),
                target: 0,
            }),
            started: Instant::now(),
        });

        shared.set_worker_target(initial_workers)?;

        let controller =
            feedback_enabled.then(|| feedback::spawn_controller(shared.clone(), feedback));

        Ok(Self {
            shared,
            job_tx: Some(job_tx),
            controller,
        })
    }

    /// Submit one job. Registers the outstanding unit before the job becomes
    /// visible to workers, then enqueues it, blocking under backpressure.
    pub fn submit<F>(&self, action: F, payload: P) -> Result<()>
    where
        F: Fn(P) + Send + Sync + 'static,
    {
        self.submit_with(Arc::new(action), payload)
    }

    /// Submit one job per payload, sharing a single action.
    pub fn submit_all<F, I>(&self, action: F, payloads: I) -> Result<()>
    where
        F: Fn(P) + Send + Sync + 'static,
        I: IntoIterator<Item = P>,
    {
        let action: JobAction<P> = Arc::new(action);
        for payload in payloads {
            self.submit_with(action.clone(), payload)?;
        }
        Ok(())
    }

    fn submit_with(&self, action: JobAction<P>, payload: P) -> Result<()> {
        if !self.shared.accepting.load(Ordering::Acquire) {
            bail!("pool is no longer accepting jobs");
        }
        let tx = self.job_tx.as_ref().context("pool is shut down")?;

        let job = Job::new(action, payload);
        self.shared.latch.add(1);
        if tx.send(job).is_err() {
            self.shared.latch.count_down();
            bail!("job queue is closed");
        }
        Ok(())
    }

    /// Block until every submitted job's completion has been signalled.
    pub fn wait_all(&self) {
        self.shared.latch.wait();
    }

    /// Graceful drain: stop accepting submissions, wait for outstanding
    /// work to finish, stop the controller, then retire and join every
    /// worker. No queued job is lost.
    pub fn shutdown(mut self) -> Result<()> {
        self.shared.accepting.store(false, Ordering::Release);
        self.shared.latch.wait();

        if let Some(controller) = self.controller.take() {
            controller.stop();
        }
        // Closing the queue lets idle workers observe the disconnect.
        self.job_tx.take();

        let handles = {
            let mut reg = self.shared.registry.lock().unwrap();
            reg.target = 0;
            let mut handles: Vec<WorkerHandle> = reg.retired.drain(..).collect();
            for slot in reg.slots.iter_mut() {
                if let Some(handle) = slot.take() {
                    handle.retire();
                    handles.push(handle);
                }
            }
            handles
        };
        for handle in handles {
            handle.join();
        }
        debug!(completed = self.shared.completed_count(), "pool shut down");
        Ok(())
    }

    /// Monotonic count of completed jobs.
    pub fn completed_count(&self) -> u64 {
        self.shared.completed_count()
    }

    /// Number of currently active workers (occupied registry slots).
    pub fn worker_count(&self) -> usize {
        self.shared.worker_count()
    }

    /// The hard ceiling on queue length and worker count.
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    pub fn stats(&self) -> PoolStats {
        let elapsed = self.shared.elapsed();
        let completed = self.shared.completed_count();
        PoolStats {
            elapsed,
            completed,
            workers: self.shared.worker_count(),
            average_speed: completed as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        }
    }
}

impl<P: Send + 'static> Drop for WorkerPool<P> {
    /// Dropping without [`WorkerPool::shutdown`] detaches the workers: the
    /// queue closes, remaining jobs drain, and each worker exits on
    /// disconnect. Nothing is joined.
    fn drop(&mut self) {
        self.shared.accepting.store(false, Ordering::Release);
        if let Some(controller) = self.controller.take() {
            controller.stop();
        }
        if self.job_tx.take().is_some() {
            warn!("worker pool dropped without shutdown; detaching workers");
        }
    }
}

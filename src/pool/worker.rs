use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::RecvTimeoutError;
use tracing::debug;

use super::core::PoolShared;

/// How long a worker blocks on an empty queue before re-checking its
/// retirement flag. Bounds retirement latency for idle workers.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to one worker thread, owned by the pool's registry.
///
/// The `retiring` flag is the only externally settable piece of worker
/// state; the worker checks it between jobs, so retirement is cooperative
/// and never interrupts a job in flight.
pub(crate) struct WorkerHandle {
    id: usize,
    retiring: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawn a worker on the given registry slot.
    pub(crate) fn spawn<P: Send + 'static>(
        id: usize,
        shared: Arc<PoolShared<P>>,
    ) -> std::io::Result<Self> {
        let retiring = Arc::new(AtomicBool::new(false));
        let busy = Arc::new(AtomicBool::new(false));

        let thread_retiring = retiring.clone();
        let thread_busy = busy.clone();
        let thread = std::thread::Builder::new()
            .name(format!("scurry-worker-{id}"))
            .spawn(move || run(id, shared, thread_retiring, thread_busy))?;

        Ok(Self {
            id,
            retiring,
            busy,
            thread,
        })
    }

    /// Ask the worker to exit after its current job.
    pub(crate) fn retire(&self) {
        self.retiring.store(true, Ordering::Release);
    }

    #[allow(dead_code)]
    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Wait for the worker thread to exit.
    pub(crate) fn join(self) {
        if self.thread.join().is_err() {
            debug!(worker = self.id, "worker thread panicked");
        }
    }
}

/// Worker loop: Active until retirement is observed between jobs, then
/// Terminated. A job that was already dequeued always runs to completion.
fn run<P: Send + 'static>(
    id: usize,
    shared: Arc<PoolShared<P>>,
    retiring: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
) {
    debug!(worker = id, "worker started");
    loop {
        if retiring.load(Ordering::Acquire) {
            break;
        }

        match shared.jobs().recv_timeout(IDLE_POLL_INTERVAL) {
            Ok(job) => {
                busy.store(true, Ordering::Release);
                job.run();
                busy.store(false, Ordering::Release);
                shared.record_completion();
            }
            // Idle; loop around to re-check the retirement flag.
            Err(RecvTimeoutError::Timeout) => continue,
            // All submitters are gone and the queue is drained.
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!(worker = id, "worker exiting");
}

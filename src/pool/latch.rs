use std::sync::{Condvar, Mutex};

/// Counts outstanding jobs and lets callers block until all of them finish.
///
/// `add` is called by the submitter before the job becomes visible to any
/// worker, so a fast worker can never drive the count to zero while a
/// submission is still in flight.
pub(crate) struct CompletionLatch {
    outstanding: Mutex<usize>,
    done: Condvar,
}

impl CompletionLatch {
    pub(crate) fn new() -> Self {
        Self {
            outstanding: Mutex::new(0),
            done: Condvar::new(),
        }
    }

    /// Register `n` units of outstanding work.
    pub(crate) fn add(&self, n: usize) {
        let mut count = self.outstanding.lock().unwrap();
        *count += n;
    }

    /// Signal one completed unit. Underflow means a worker signalled a job
    /// that was never registered.
    pub(crate) fn count_down(&self) {
        let mut count = self.outstanding.lock().unwrap();
        debug_assert!(*count > 0, "completion signalled with no outstanding work");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.done.notify_all();
        }
    }

    /// Block until the outstanding count reaches zero.
    pub(crate) fn wait(&self) {
        let mut count = self.outstanding.lock().unwrap();
        while *count > 0 {
            count = self.done.wait(count).unwrap();
        }
    }

    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> usize {
        *self.outstanding.lock().unwrap()
    }
}

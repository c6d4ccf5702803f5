use std::sync::Arc;
use uuid::Uuid;

/// Action invoked by a worker with the job's payload.
///
/// The action has no return value and no error channel: any outcome
/// (success, failure, results worth keeping) must be recorded through the
/// action's own side effects. The pool only ever observes "completed".
pub type JobAction<P> = Arc<dyn Fn(P) + Send + Sync + 'static>;

/// One unit of submitted work: a typed payload plus the closure to run it.
///
/// Jobs are immutable once created, consumed exactly once by exactly one
/// worker, and discarded afterwards.
pub struct Job<P> {
    id: String,
    payload: P,
    action: JobAction<P>,
}

impl<P> Job<P> {
    /// Create a job with a fresh unique id.
    pub(crate) fn new(action: JobAction<P>, payload: P) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload,
            action,
        }
    }

    /// Unique identifier assigned at submission time.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Execute the job, consuming it.
    pub(crate) fn run(self) {
        (self.action)(self.payload);
    }
}

impl<P> std::fmt::Debug for Job<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("id", &self.id).finish()
    }
}

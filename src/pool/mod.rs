//! Adaptive worker pool.
//!
//! This module is the concurrency core of scurry: a bounded job queue, a
//! registry of worker threads, completion tracking with a blocking
//! wait-for-all, and an optional feedback controller that grows or shrinks
//! the active worker set from observed throughput.
//!
//! Responsibilities are split the same way the data flows:
//! - [`job`]: one unit of submitted work (typed payload + action closure)
//! - [`worker`]: the dequeue/execute/signal loop and cooperative retirement
//! - [`core`]: the pool itself, with submission, backpressure, and wait
//! - [`feedback`]: the periodic controller and its control law
//!
//! The pool never inspects job outcomes, never retries, and imposes no
//! per-job timeouts; actions own their own deadlines and error reporting.
//!
//! # Example
//!
//! ```rust,no_run
//! use scurry::pool::WorkerPool;
//!
//! let pool = WorkerPool::new(4, 100, false)?;
//! pool.submit_all(|n: u32| { let _ = n * 2; }, 0u32..1000)?;
//! pool.wait_all();
//! pool.shutdown()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod core;
pub mod feedback;
pub mod job;
mod latch;
mod worker;

pub use self::core::{PoolStats, WorkerPool};
pub use self::feedback::FeedbackConfig;
pub use self::job::Job;

//! # scurry: adaptive worker-pool HTTP probe scanner
//!
//! Scurry runs a large stream of independent HTTP probes against a list of
//! hosts on a pool of worker threads. The pool's size is either fixed or
//! driven at runtime by a feedback controller that samples completed-job
//! throughput and grows or shrinks the worker set under a hard capacity
//! ceiling.
//!
//! The interesting machinery lives in [`pool`]; everything else (target
//! input, the probe itself, result persistence, configuration, CLI) is a
//! thin, replaceable layer around it.
//!
//! ## Quick start
//!
//! ```bash
//! # Probe every host in targets.txt with an adaptive pool
//! scurry scan --targets targets.txt --feedback
//! ```

pub mod cli;
pub mod config;
pub mod pool;
pub mod probe;
pub mod report;
pub mod targets;

pub use cli::Cli;
pub use config::ScurryConfig;
pub use pool::{FeedbackConfig, WorkerPool};

/// Result type alias for scurry operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

//! The `scan` command: wire targets, prober, sink, and pool together.

use std::sync::Arc;

use anyhow::Result;

use crate::cli::Output;
use crate::config::ScurryConfig;
use crate::pool::WorkerPool;
use crate::probe::Prober;
use crate::report::ResultSink;
use crate::targets::read_targets;

pub struct ScanArgs {
    pub targets: String,
    pub output: Option<String>,
    pub workers: Option<usize>,
    pub capacity: Option<usize>,
    pub feedback: bool,
}

pub fn execute(args: ScanArgs, mut config: ScurryConfig, output: &Output) -> Result<()> {
    // Command-line flags win over the config file
    if let Some(workers) = args.workers {
        config.pool.initial_workers = workers;
    }
    if let Some(capacity) = args.capacity {
        config.pool.capacity = capacity;
    }
    if args.feedback {
        config.pool.feedback = true;
    }
    if let Some(path) = args.output {
        config.report.output = path;
    }

    let targets = read_targets(&args.targets)?;
    if targets.is_empty() {
        output.warning("no targets to probe");
        return Ok(());
    }
    let total = targets.len();

    // Sink and prober live longer than the pool: created before it starts,
    // flushed after it drains.
    let sink = Arc::new(ResultSink::create(&config.report.output)?);
    let prober = Arc::new(Prober::new(&config.probe, sink.clone())?);

    let initial_workers = config.pool.effective_initial_workers();
    let pool = WorkerPool::with_config(
        initial_workers,
        config.pool.capacity,
        config.pool.feedback,
        config.feedback.to_config(),
    )?;

    output.step(&format!(
        "probing {} targets with {} workers (capacity {}, feedback {})",
        total,
        initial_workers,
        config.pool.capacity,
        if config.pool.feedback { "on" } else { "off" },
    ));

    pool.submit_all(move |host: String| prober.probe(&host), targets)?;
    pool.wait_all();

    let stats = pool.stats();
    pool.shutdown()?;
    sink.flush()?;

    output.success(&format!(
        "probed {} targets in {:.1}s ({:.1} jobs/s)",
        total,
        stats.elapsed.as_secs_f64(),
        stats.average_speed,
    ));
    output.key_value("results", &config.report.output, false);
    Ok(())
}

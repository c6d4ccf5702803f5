//! Throughput feedback controller.
//!
//! An independent thread samples the pool's completed-job counter on two
//! timers: a short telemetry tick that only logs a realtime figure, and a
//! longer control tick (the window) that is the sole point where worker
//! count decisions are made.
//!
//! The control law is a proportional policy with asymmetric gain: additive
//! gain-scaled growth when windowed throughput rises, a proportional
//! pull-back when it falls, with the candidate floored at the all-time peak
//! throughput and capped at the pool's capacity bound. It is a heuristic
//! carried over from field use, not a proven-stable control law; the gains
//! are configuration for exactly that reason.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, bounded, tick};
use crossbeam::select;
use tracing::{info, warn};

use super::core::PoolShared;

/// Tuning for the feedback controller.
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    /// Control window: how often worker-count decisions are made.
    pub window: Duration,
    /// Telemetry tick: how often the advisory throughput line is logged.
    pub telemetry_interval: Duration,
    /// Workers added per unit of throughput gained between windows.
    pub growth_gain: f64,
    /// Fraction of the previous window's throughput pulled back when
    /// throughput falls.
    pub shrink_fraction: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(10),
            telemetry_interval: Duration::from_secs(1),
            growth_gain: 2.0,
            shrink_fraction: 0.5,
        }
    }
}

/// Handle used by the pool to stop and join the controller thread.
pub(crate) struct ControllerHandle {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl ControllerHandle {
    pub(crate) fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.thread.join();
    }
}

pub(crate) fn spawn_controller<P: Send + 'static>(
    shared: Arc<PoolShared<P>>,
    config: FeedbackConfig,
) -> ControllerHandle {
    let (stop_tx, stop_rx) = bounded(1);
    let thread = std::thread::spawn(move || run(shared, config, stop_rx));
    ControllerHandle { stop_tx, thread }
}

fn run<P: Send + 'static>(shared: Arc<PoolShared<P>>, config: FeedbackConfig, stop_rx: Receiver<()>) {
    let telemetry_ticker = tick(config.telemetry_interval);
    let control_ticker = tick(config.window);
    let window_secs = config.window.as_secs_f64();

    let mut window_last_done = shared.completed_count();
    let mut realtime_last_done = window_last_done;
    let mut previous_throughput = 0.0_f64;
    let mut max_observed_throughput = 0.0_f64;

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(telemetry_ticker) -> _ => {
                let done = shared.completed_count();
                let realtime_speed = (done - realtime_last_done) as f64
                    / config.telemetry_interval.as_secs_f64();
                realtime_last_done = done;

                let elapsed = shared.elapsed();
                let average_speed = done as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
                info!(
                    elapsed_secs = elapsed.as_secs_f64(),
                    average_speed,
                    realtime_speed,
                    workers = shared.worker_count(),
                    done_jobs = done,
                    "pool telemetry"
                );
            }
            recv(control_ticker) -> _ => {
                // One load per tick: the window delta must come from a
                // consistent snapshot of the counter.
                let done = shared.completed_count();
                let window_throughput = (done - window_last_done) as f64 / window_secs;
                max_observed_throughput = max_observed_throughput.max(window_throughput);

                let current = shared.worker_target();
                let candidate = next_target(
                    current,
                    window_throughput,
                    previous_throughput,
                    max_observed_throughput,
                    shared.capacity(),
                    &config,
                );
                if candidate != current {
                    if let Err(e) = shared.set_worker_target(candidate) {
                        warn!(error = %e, "feedback adjustment failed");
                    }
                }

                previous_throughput = window_throughput;
                window_last_done = done;
            }
        }
    }
}

/// The control law: compute the next worker-count target from the windowed
/// throughput sample. Pure so it can be tested deterministically.
fn next_target(
    current: usize,
    window_throughput: f64,
    previous_throughput: f64,
    max_observed_throughput: f64,
    capacity: usize,
    config: &FeedbackConfig,
) -> usize {
    let current = current as f64;
    let candidate = if window_throughput > previous_throughput {
        current + config.growth_gain * (window_throughput - previous_throughput)
    } else if window_throughput < previous_throughput {
        current - config.shrink_fraction * previous_throughput
    } else {
        // Flat window: hold the current target.
        current
    };

    candidate
        .max(max_observed_throughput)
        .min(capacity as f64)
        .max(0.0)
        .round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FeedbackConfig {
        FeedbackConfig {
            growth_gain: 2.0,
            shrink_fraction: 0.5,
            ..FeedbackConfig::default()
        }
    }

    #[test]
    fn test_rising_throughput_grows_target() {
        // 4 workers, throughput rose from 3/s to 6/s: 4 + 2*(6-3) = 10.
        let target = next_target(4, 6.0, 3.0, 6.0, 100, &config());
        assert_eq!(target, 10);
    }

    #[test]
    fn test_three_rising_windows_never_decrease_target() {
        let cfg = config();
        let mut target = 2;
        let mut previous = 0.0;
        let mut peak = 0.0_f64;
        for throughput in [2.0, 5.0, 9.0] {
            peak = peak.max(throughput);
            let next = next_target(target, throughput, previous, peak, 100, &cfg);
            assert!(next >= target);
            target = next;
            previous = throughput;
        }
    }

    #[test]
    fn test_falling_throughput_shrinks_target() {
        // 12 workers, throughput fell from 8/s to 2/s: 12 - 0.5*8 = 8,
        // floored at peak 8.
        let target = next_target(12, 2.0, 8.0, 8.0, 100, &config());
        assert_eq!(target, 8);
    }

    #[test]
    fn test_flat_throughput_holds_target() {
        assert_eq!(next_target(7, 4.0, 4.0, 4.0, 100, &config()), 7);
    }

    #[test]
    fn test_target_never_exceeds_capacity() {
        let target = next_target(4, 500.0, 1.0, 500.0, 10, &config());
        assert_eq!(target, 10);
    }

    #[test]
    fn test_target_floored_at_peak_throughput() {
        // Deep pull-back would land at 6 - 0.5*10 = 1; the historical peak
        // of 10 wins.
        let target = next_target(6, 1.0, 10.0, 10.0, 100, &config());
        assert_eq!(target, 10);
    }

    #[test]
    fn test_out_of_range_candidate_is_corrected_not_fatal() {
        // A wildly negative candidate clamps to zero instead of wrapping.
        let target = next_target(1, 0.0, 100.0, 0.0, 100, &config());
        assert_eq!(target, 0);
    }
}

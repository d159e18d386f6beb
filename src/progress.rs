use chrono::{DateTime, TimeDelta, Utc};

/// Receives work-unit updates during a run. One unit is one input point.
pub trait ProgressReporter {
    /// `total` is `None` when the caller could not tell the size of the input
    /// up front.
    fn report(&mut self, done: u64, total: Option<u64>);
}

pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&mut self, _done: u64, _total: Option<u64>) {}
}

/// Wall-clock timer for a run.
#[derive(Clone, Copy, Debug)]
pub struct StopWatch {
    started_at: DateTime<Utc>,
}

impl StopWatch {
    pub fn start() -> Self {
        StopWatch {
            started_at: Utc::now(),
        }
    }

    pub fn elapsed(&self) -> TimeDelta {
        Utc::now() - self.started_at
    }
}

/// `HH:MM:SS`, hours are not wrapped.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Logs progress at `info` level, at most once per `interval`. The final
/// update (done == total) is always logged.
pub struct LogProgress {
    watch: StopWatch,
    interval: TimeDelta,
    last_logged: Option<DateTime<Utc>>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::with_interval(TimeDelta::milliseconds(500))
    }

    pub fn with_interval(interval: TimeDelta) -> Self {
        LogProgress {
            watch: StopWatch::start(),
            interval,
            last_logged: None,
        }
    }

    fn should_log(&self, now: DateTime<Utc>, done: u64, total: Option<u64>) -> bool {
        if total == Some(done) {
            return true;
        }
        match self.last_logged {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }
}

impl ProgressReporter for LogProgress {
    fn report(&mut self, done: u64, total: Option<u64>) {
        let now = Utc::now();
        if !self.should_log(now, done, total) {
            return;
        }
        self.last_logged = Some(now);
        let elapsed = format_elapsed(self.watch.elapsed());
        match total {
            Some(total) if total > 0 => info!(
                "{} - {}/{} points ({:.2}%)",
                elapsed,
                done,
                total,
                done as f64 * 100.0 / total as f64
            ),
            _ => info!("{} - {} points", elapsed, done),
        }
    }
}

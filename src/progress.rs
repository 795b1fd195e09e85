//! Coarse progress reporting shared by worker threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

pub struct Progress {
    total: usize,
    interval: usize,
    done: AtomicUsize,
    started: Instant,
}

impl Progress {
    /// Report every `interval` ticks (at least 1).
    pub fn new(total: usize, interval: usize) -> Self {
        Self {
            total,
            interval: interval.max(1),
            done: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    /// Count one finished item; returns the running total.
    pub fn tick(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.interval == 0 && done < self.total {
            info!(done, total = self.total, "progress {}%", done * 100 / self.total);
        }
        done
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn end(&self) {
        info!(
            done = self.done(),
            total = self.total,
            "processed {} of {} files in {}",
            self.done(),
            self.total,
            time_string(self.started.elapsed())
        );
    }
}

/// Compact human-readable duration: `1h 2m 3s`, `4s 250ms`, `12ms`.
pub fn time_string(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let (h, rest) = (millis / 3_600_000, millis % 3_600_000);
    let (m, rest) = (rest / 60_000, rest % 60_000);
    let (s, ms) = (rest / 1000, rest % 1000);

    let mut parts = Vec::new();
    if h > 0 {
        parts.push(format!("{}h", h));
    }
    if m > 0 {
        parts.push(format!("{}m", m));
    }
    if s > 0 {
        parts.push(format!("{}s", s));
    }
    if h == 0 && m == 0 && (ms > 0 || parts.is_empty()) {
        parts.push(format!("{}ms", ms));
    }
    parts.join(" ")
}

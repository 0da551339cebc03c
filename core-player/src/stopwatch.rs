//! # Playback Stopwatch
//!
//! Speed-scaled elapsed-time tracker for the playback position.
//!
//! The engine's own position reporting cannot be trusted across rate
//! changes: the pipeline is torn down and rebuilt, and briefly reports stale
//! or zero values during the transition. The stopwatch keeps an independent,
//! monotonic notion of position in unscaled track seconds.
//!
//! For discontinuous jumps (seek, rate change, source replacement) a fresh
//! stopwatch is constructed with the new origin and rate rather than
//! mutating the old one, so a stale rate can never survive a rate change.

use player_bridge::time::MonotonicClock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tracks elapsed playback time as `origin + wall_elapsed * rate`.
///
/// The origin is always expressed in unscaled track seconds; `rate` scales
/// only the wall time accumulated while running.
pub struct AudioStopwatch {
    origin: Duration,
    rate: f64,
    started_at: Option<Instant>,
    clock: Arc<dyn MonotonicClock>,
}

impl AudioStopwatch {
    /// Create a stopped stopwatch at `origin`, scaling wall time by `rate`.
    pub fn new(origin: Duration, rate: f64, clock: Arc<dyn MonotonicClock>) -> Self {
        Self {
            origin,
            rate,
            started_at: None,
            clock,
        }
    }

    /// Begin accumulating scaled time. No-op if already running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    /// Freeze the elapsed value. No-op if already stopped.
    pub fn stop(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.origin += self.scale(self.clock.now() - started);
        }
    }

    /// Stop and rewind to zero, keeping the rate.
    pub fn reset(&mut self) {
        self.origin = Duration::ZERO;
        self.started_at = None;
    }

    /// Current elapsed position in track time.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started) => self.origin + self.scale(self.clock.now() - started),
            None => self.origin,
        }
    }

    /// Returns `true` while the stopwatch is accumulating time.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// The rate this stopwatch scales wall time by.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn scale(&self, wall: Duration) -> Duration {
        Duration::from_secs_f64(wall.as_secs_f64() * self.rate)
    }
}

impl std::fmt::Debug for AudioStopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStopwatch")
            .field("origin", &self.origin)
            .field("rate", &self.rate)
            .field("running", &self.is_running())
            .finish()
    }
}

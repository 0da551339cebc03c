//! Time abstraction.
//!
//! Provides an injectable monotonic time source so position tracking can be
//! tested deterministically. The playback stopwatch measures elapsed wall
//! time against this clock rather than trusting the engine's own position
//! reporting, which goes stale during engine resets.

use std::time::Instant;

/// Monotonic time source.
///
/// # Example
///
/// ```ignore
/// use player_bridge::time::MonotonicClock;
///
/// fn elapsed_since(clock: &dyn MonotonicClock, start: std::time::Instant) {
///     let now = clock.now();
///     println!("elapsed: {:?}", now - start);
/// }
/// ```
pub trait MonotonicClock: Send + Sync {
    /// Get the current monotonic instant.
    fn now(&self) -> Instant;
}

/// System clock implementation using `Instant::now()`.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl MonotonicClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

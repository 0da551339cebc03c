//! # Volume / Balance Mapping
//!
//! Maps a `(volume, balance)` pair to per-channel gains using the
//! constant-power pan rule (-3 dB center), which keeps perceived loudness
//! constant across balance positions.

use std::f64::consts::PI;

/// Compute `(left, right)` channel gains for the given volume and balance.
///
/// Volume is clamped to `[0.0, 1.0]` and balance to `[-1.0, 1.0]` before
/// mapping. For every valid input, `left^2 + right^2 == volume^2` within
/// floating tolerance.
pub fn channel_gains(volume: f64, balance: f64) -> (f32, f32) {
    let volume = volume.clamp(0.0, 1.0);
    let balance = balance.clamp(-1.0, 1.0);

    // Constant power pan rule: http://www.rs-met.com/documents/tutorials/PanRules.pdf
    let angle = PI * (balance + 1.0) / 4.0;
    let left = angle.cos() * volume;
    let right = angle.sin() * volume;

    (left as f32, right as f32)
}

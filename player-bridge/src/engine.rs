//! Playback engine abstraction.
//!
//! [`PlaybackEngine`] is the thin call-through to the platform's decode and
//! render pipeline (MediaPlayer, AVAudioPlayer, a software mixer, ...). The
//! core treats it as an external collaborator: calls are synchronous and
//! expected to return promptly, and the engine's own notion of "playing" is
//! only a hint -- the core keeps the authoritative playback state because
//! several platforms lose theirs whenever the engine is reset.
//!
//! ## Reset semantics
//!
//! `reset()` returns the pipeline to an unprepared state. After a reset the
//! previously prepared source is invalid and `prepare()` must run again
//! before any other call. Some engines auto-start after a seek that follows
//! a reset; the core suppresses that with an explicit `pause()`.

use crate::error::Result;
use crate::source::ResolvedSource;
use std::time::Duration;

/// Track duration as reported by the engine after `prepare()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineDuration {
    /// Total duration of the prepared source.
    Known(Duration),
    /// The engine cannot determine the duration (live or unparsable source).
    Unknown,
}

impl EngineDuration {
    /// Returns the duration if known.
    pub fn known(&self) -> Option<Duration> {
        match self {
            EngineDuration::Known(d) => Some(*d),
            EngineDuration::Unknown => None,
        }
    }
}

/// Platform decode/render pipeline driven by the playback core.
///
/// Implementations wrap a single native player instance. All methods are
/// called from the player's single owner context; implementations do not
/// need internal synchronization for calls coming from the core.
pub trait PlaybackEngine: Send {
    /// Attach a source and prime the decoder.
    ///
    /// Called after construction, after every `reset()`, and when the source
    /// is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or decoded.
    fn prepare(&mut self, source: &ResolvedSource) -> Result<EngineDuration>;

    /// Begin or resume rendering from the current position.
    fn start(&mut self) -> Result<()>;

    /// Halt rendering, keeping the prepared pipeline and position.
    fn pause(&mut self) -> Result<()>;

    /// Return the pipeline to an unprepared state.
    ///
    /// Invalidates the prepared source; `prepare()` must run again.
    fn reset(&mut self) -> Result<()>;

    /// Seek to an absolute position. Engines clamp internally to the track.
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Apply a playback rate to the engine.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Unsupported`](crate::BridgeError::Unsupported)
    /// when the device rejects the exact rate value. Implementations must
    /// fail loudly here rather than continue producing no audio.
    fn set_rate(&mut self, rate: f32) -> Result<()>;

    /// Apply per-channel gains (left, right), each in `[0.0, 1.0]`.
    fn set_channel_gains(&mut self, left: f32, right: f32) -> Result<()>;

    /// Enable or disable engine-level looping.
    fn set_looping(&mut self, looping: bool) -> Result<()>;

    /// The engine's own playing flag.
    ///
    /// Only a hint: momentarily wrong during reset/rebuild transitions. The
    /// core's state machine is authoritative for `is_playing`.
    fn is_engine_playing(&self) -> bool;

    /// Returns `true` if the engine can decode directly from a memory buffer.
    ///
    /// When `false`, the core spills in-memory sources to a temp cache file
    /// before preparing.
    fn supports_buffer_source(&self) -> bool {
        true
    }

    /// Returns `true` if the engine supports changing the playback rate.
    fn supports_rate_change(&self) -> bool {
        true
    }
}

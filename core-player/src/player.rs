//! # Audio Player State Machine
//!
//! Single serialization point for all playback commands and system
//! callbacks. User commands (`play`, `pause`, `stop`, `seek`, `set_speed`)
//! and asynchronous host notifications (`handle_focus_change`,
//! `handle_playback_ended`) all mutate state here; the host is expected to
//! deliver callbacks on the same serialized context as commands, so no
//! internal locking is needed.
//!
//! ## Playing state
//!
//! The player keeps its own [`PlaybackState`] instead of trusting the
//! engine's playing flag: the engine is reset during rate changes and
//! momentarily loses its own notion of "playing". All public queries answer
//! from the intrinsic state; the engine flag is only consulted as a hint
//! when a playback-ended notification arrives.
//!
//! ## Rate changes
//!
//! Applying a playback rate while the pipeline is live raises platform
//! errors or silently fails on several engines, so the whole operation is a
//! snapshot / tear-down / rebuild / restore transaction (see
//! [`AudioPlayer::set_speed`]). An in-flight guard rejects overlapping
//! requests because the transaction mutates and restores engine state
//! destructively and is not reentrant-safe.

use crate::error::{PlayerError, Result};
use crate::focus::{FocusArbitrator, DUCKING_VOLUME_MULTIPLIER};
use crate::options::PlayerOptions;
use crate::pan::channel_gains;
use crate::stopwatch::AudioStopwatch;
use bytes::Bytes;
use player_bridge::engine::PlaybackEngine;
use player_bridge::focus::{FocusChange, FocusService};
use player_bridge::source::{PlaybackSource, ResolvedSource, SourceResolver};
use player_bridge::time::{MonotonicClock, SystemClock};
use player_bridge::{BridgeError, FsResolver};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Lowest accepted playback speed.
pub const MIN_SPEED: f64 = 0.0;

/// Highest accepted playback speed.
pub const MAX_SPEED: f64 = 2.5;

/// Default volume for a fresh player.
const DEFAULT_VOLUME: f64 = 0.5;

/// Intrinsic playback lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No playback session (fresh player, after stop, or source replaced).
    Idle,
    /// Audio is rendering.
    Playing,
    /// Paused with position preserved.
    Paused,
    /// The track played to its natural end.
    Ended,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Ended => write!(f, "ended"),
        }
    }
}

/// Playback rate bookkeeping.
struct SpeedState {
    /// Requested speed after clamping to `[MIN_SPEED, MAX_SPEED]`.
    requested: f64,
    /// Rate value handed to the engine.
    engine_rate: f32,
    /// Mutual-exclusion guard for the rate-change transaction.
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag on every exit path, including failures.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn arm(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-stream audio player over a platform engine.
pub struct AudioPlayer {
    engine: Box<dyn PlaybackEngine>,
    resolver: Box<dyn SourceResolver>,
    focus: FocusArbitrator,
    clock: Arc<dyn MonotonicClock>,

    source: Option<PlaybackSource>,
    /// Temp file holding a spilled buffer source, deleted on disposal.
    cache_path: Option<PathBuf>,
    duration: Option<Duration>,

    state: PlaybackState,
    stopwatch: AudioStopwatch,

    volume: f64,
    balance: f64,
    speed: SpeedState,
    looping: bool,

    last_engine_error: Option<i32>,
    on_playback_ended: Option<Box<dyn FnMut() + Send>>,
    disposed: bool,
}

impl AudioPlayer {
    /// Create a player with the default filesystem resolver and system clock.
    pub fn new(
        engine: Box<dyn PlaybackEngine>,
        focus: Box<dyn FocusService>,
        options: PlayerOptions,
    ) -> Self {
        Self::with_parts(
            engine,
            focus,
            Box::new(FsResolver),
            Arc::new(SystemClock),
            options,
        )
    }

    /// Create a player with explicit collaborators (used by hosts and tests).
    pub fn with_parts(
        engine: Box<dyn PlaybackEngine>,
        focus: Box<dyn FocusService>,
        resolver: Box<dyn SourceResolver>,
        clock: Arc<dyn MonotonicClock>,
        options: PlayerOptions,
    ) -> Self {
        let focus = FocusArbitrator::new(focus, options.focus_attributes(), options.manage_focus);
        let stopwatch = AudioStopwatch::new(Duration::ZERO, 1.0, clock.clone());

        Self {
            engine,
            resolver,
            focus,
            clock,
            source: None,
            cache_path: None,
            duration: None,
            state: PlaybackState::Idle,
            stopwatch,
            volume: DEFAULT_VOLUME,
            balance: 0.0,
            speed: SpeedState {
                requested: 1.0,
                engine_rate: 1.0,
                in_flight: Arc::new(AtomicBool::new(false)),
            },
            looping: false,
            last_engine_error: None,
            on_playback_ended: None,
            disposed: false,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Replace the audio source, fully resetting playback state.
    ///
    /// Does not auto-start; call [`play`](Self::play) afterwards.
    ///
    /// # Errors
    ///
    /// - [`PlayerError::InvalidSource`] for an empty buffer or asset name
    /// - [`PlayerError::SourceNotFound`] when the source cannot be resolved
    /// - [`PlayerError::Engine`] when the engine rejects the source
    pub fn set_source(&mut self, source: PlaybackSource) -> Result<()> {
        match &source {
            PlaybackSource::Buffer { data } if data.is_empty() => {
                return Err(PlayerError::InvalidSource("empty audio buffer".into()));
            }
            PlaybackSource::Asset { name } if name.is_empty() => {
                return Err(PlayerError::InvalidSource("empty asset name".into()));
            }
            _ => {}
        }

        self.engine.reset()?;
        self.remove_cache_file();
        self.source = Some(source);
        self.prepare_source()?;

        self.stopwatch = AudioStopwatch::new(Duration::ZERO, self.speed(), self.clock.clone());
        self.state = PlaybackState::Idle;
        debug!(duration = ?self.duration, "source replaced");
        Ok(())
    }

    /// Start playback.
    ///
    /// If already playing, restarts from position zero (replay-from-start).
    /// If the track has ended, seeks back to zero first. Requests audio
    /// focus; denial is logged and playback proceeds anyway.
    pub fn play(&mut self) -> Result<()> {
        if self.source.is_none() {
            return Err(PlayerError::InvalidSource("no audio source set".into()));
        }

        // A fresh user command supersedes any pending resume-on-gain intent.
        self.focus.clear_memory();

        if self.is_playing() {
            self.engine.pause()?;
            self.seek(Duration::ZERO)?;
            self.stopwatch.reset();
        } else if matches!(self.duration, Some(d) if self.current_position() >= d) {
            self.seek(Duration::ZERO)?;
            self.stopwatch.reset();
        }

        if !self.focus.request() && self.focus.is_enabled() {
            // Non-fatal by design: playback proceeds without the token.
            warn!("audio focus request denied, continuing playback");
        }

        self.play_internal()
    }

    /// Pause playback, freezing the position. No-op unless playing.
    pub fn pause(&mut self) -> Result<()> {
        if !self.is_playing() {
            return Ok(());
        }

        self.focus.clear_memory();
        self.pause_internal()?;
        self.focus.abandon();
        Ok(())
    }

    /// Stop playback, rewind to zero, and fire the playback-ended event.
    pub fn stop(&mut self) -> Result<()> {
        if self.is_playing() {
            self.state = PlaybackState::Idle;
            self.engine.pause()?;
        }

        self.focus.clear_memory();
        self.focus.abandon();
        self.seek(Duration::ZERO)?;

        self.stopwatch.reset();
        self.emit_playback_ended();
        self.state = PlaybackState::Idle;
        Ok(())
    }

    /// Seek to an absolute position. The engine clamps to the track bounds.
    ///
    /// Replaces the stopwatch with a fresh one at the new origin; if
    /// currently playing the new stopwatch starts immediately so position
    /// tracking continues without a gap.
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        self.engine.seek(position)?;

        let mut stopwatch = AudioStopwatch::new(position, self.speed(), self.clock.clone());
        if self.is_playing() {
            stopwatch.start();
        }
        self.stopwatch = stopwatch;
        Ok(())
    }

    /// Change the playback rate.
    ///
    /// The requested speed is clamped to `[MIN_SPEED, MAX_SPEED]`; only an
    /// exact rate value rejected by the device fails. Rate changes are
    /// destructive at the engine layer, so the operation snapshots position
    /// and play state, tears the pipeline down, rebuilds it from the source,
    /// applies the rate, and restores the snapshot.
    ///
    /// An overlapping call while a change is in flight is ignored with a
    /// diagnostic log: the overlapping call is a caller bug, and the
    /// original transaction's outcome matters more than punishing it.
    ///
    /// # Errors
    ///
    /// [`PlayerError::UnsupportedSpeed`] when the device rejects the rate;
    /// the failure always surfaces rather than continuing muted.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !self.engine.supports_rate_change() {
            warn!("engine does not support changing the playback rate");
            return Ok(());
        }

        if self.speed.in_flight.load(Ordering::Acquire) {
            warn!("previous speed change has not completed yet, ignoring");
            return Ok(());
        }
        let _guard = InFlightGuard::arm(&self.speed.in_flight);

        let engine_rate = (speed as f32).clamp(MIN_SPEED as f32, MAX_SPEED as f32);
        let requested = speed.clamp(MIN_SPEED, MAX_SPEED);

        let previous_position = self.current_position();
        let previous_state = self.state;
        let was_playing = self.is_playing();

        // State only, not a user-visible pause: the engine is about to lose
        // its prepared pipeline and must not be queried as playing meanwhile.
        // The stopwatch stops too, so position stays frozen at the snapshot
        // if the rebuild fails partway.
        self.state = PlaybackState::Paused;
        self.stopwatch.stop();
        self.engine.reset()?;
        self.prepare_source()?;

        self.engine.set_rate(engine_rate).map_err(|err| match err {
            BridgeError::Unsupported(_) => PlayerError::UnsupportedSpeed(speed),
            other => other.into(),
        })?;

        self.speed.requested = requested;
        self.speed.engine_rate = engine_rate;

        self.stopwatch = AudioStopwatch::new(previous_position, requested, self.clock.clone());
        self.engine.seek(previous_position)?;

        if was_playing {
            self.state = PlaybackState::Playing;
            self.stopwatch.start();
            self.engine.start()?;
        } else {
            self.state = previous_state;
            // Some engines start on their own after a seek that follows a
            // reset; suppress that explicitly.
            self.engine.pause()?;
        }

        debug!(speed = requested, rate = engine_rate, "playback rate changed");
        Ok(())
    }

    /// Set the volume in `[0.0, 1.0]` and reapply channel gains.
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.volume = volume;
        self.apply_gains()
    }

    /// Set the stereo balance in `[-1.0, 1.0]` and reapply channel gains.
    pub fn set_balance(&mut self, balance: f64) -> Result<()> {
        self.balance = balance;
        self.apply_gains()
    }

    /// Enable or disable engine-level looping.
    pub fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.looping = looping;
        self.engine.set_looping(looping)?;
        Ok(())
    }

    /// Register the handler invoked when playback ends (naturally or via
    /// [`stop`](Self::stop)).
    pub fn set_playback_ended_handler(&mut self, handler: impl FnMut() + Send + 'static) {
        self.on_playback_ended = Some(Box::new(handler));
    }

    // ========================================================================
    // Host callbacks
    // ========================================================================

    /// Handle an asynchronous focus-change notification from the system.
    ///
    /// Must be delivered on the same serialized context as user commands.
    pub fn handle_focus_change(&mut self, change: FocusChange) -> Result<()> {
        match change {
            FocusChange::PermanentLoss => {
                // Clear resume/ducking memory before stopping so a stale
                // resume decision cannot race the stop.
                self.focus.clear_memory();
                self.focus.mark_lost();
                if self.is_playing() {
                    self.stop()?;
                }
            }
            FocusChange::TransientLoss => {
                if self.is_playing() {
                    self.focus.set_resume_pending();
                    // Keep the focus token: focus is expected to return.
                    self.pause_internal()?;
                }
            }
            FocusChange::TransientLossCanDuck => {
                if self.is_playing() && !self.focus.is_ducked() {
                    self.focus.begin_ducking(self.volume);
                    self.apply_gains()?;
                }
            }
            FocusChange::Gain => {
                if self.focus.take_resume_pending() {
                    // Focus is still held; resume without re-requesting.
                    self.play_internal()?;
                }
                if self.focus.take_ducked_volume().is_some() {
                    self.apply_gains()?;
                }
            }
        }
        Ok(())
    }

    /// Handle the engine's natural end-of-playback notification.
    pub fn handle_playback_ended(&mut self) {
        if self.looping {
            // The engine wraps to the start itself; restart position
            // tracking from zero and keep playing.
            self.stopwatch.reset();
            if self.is_playing() {
                self.stopwatch.start();
            }
            return;
        }

        // Engine hint used here only: recovers the rare engine that keeps
        // rendering past its completion callback.
        self.state = if self.engine.is_engine_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Ended
        };
        self.stopwatch.reset();
        self.emit_playback_ended();
    }

    /// Handle an asynchronous engine failure notification.
    ///
    /// The player stays in its last-known state; the caller recovers
    /// explicitly via [`set_source`](Self::set_source) or
    /// [`stop`](Self::stop).
    pub fn handle_engine_error(&mut self, code: i32) {
        error!(code, "engine reported an error");
        self.last_engine_error = Some(code);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Track duration, or `None` when the engine cannot determine it.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Current playback position in track time.
    pub fn current_position(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    /// Authoritative playing flag, independent of the engine's own.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Intrinsic playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// User-facing volume. Not affected by ducking.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Volume actually applied to the engine (scaled while ducked).
    pub fn effective_volume(&self) -> f64 {
        if self.focus.is_ducked() {
            self.volume * DUCKING_VOLUME_MULTIPLIER
        } else {
            self.volume
        }
    }

    /// Stereo balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Current playback speed (clamped requested value).
    pub fn speed(&self) -> f64 {
        self.speed.requested
    }

    /// Rate value last handed to the engine.
    pub fn engine_rate(&self) -> f32 {
        self.speed.engine_rate
    }

    /// Whether engine-level looping is enabled.
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Whether seeking is supported.
    pub fn can_seek(&self) -> bool {
        true
    }

    /// Whether the engine supports rate changes.
    pub fn can_set_speed(&self) -> bool {
        self.engine.supports_rate_change()
    }

    /// Lowest accepted speed.
    pub fn minimum_speed(&self) -> f64 {
        MIN_SPEED
    }

    /// Highest accepted speed.
    pub fn maximum_speed(&self) -> f64 {
        MAX_SPEED
    }

    /// Last error code delivered via [`handle_engine_error`](Self::handle_engine_error).
    pub fn last_engine_error(&self) -> Option<i32> {
        self.last_engine_error
    }

    // ========================================================================
    // Disposal
    // ========================================================================

    /// Release all held resources. Idempotent; also runs on drop.
    ///
    /// Abandons focus, resets the engine, drops the retained source, and
    /// deletes the temp cache file if one was created. Cleanup failures are
    /// swallowed (best-effort, never fatal).
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.focus.clear_memory();
        self.focus.abandon();
        if let Err(err) = self.engine.reset() {
            debug!(%err, "engine reset failed during disposal");
        }
        self.remove_cache_file();
        self.source = None;
        self.duration = None;
        self.state = PlaybackState::Idle;
        self.on_playback_ended = None;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn play_internal(&mut self) -> Result<()> {
        self.state = PlaybackState::Playing;
        self.engine.start()?;
        self.stopwatch.start();
        Ok(())
    }

    fn pause_internal(&mut self) -> Result<()> {
        self.state = PlaybackState::Paused;
        self.engine.pause()?;
        self.stopwatch.stop();
        Ok(())
    }

    /// Resolve the current source and prime the engine.
    ///
    /// Runs at set-source time and again after every engine reset, because
    /// resetting invalidates the prepared pipeline entirely.
    fn prepare_source(&mut self) -> Result<()> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| PlayerError::InvalidSource("no audio source set".into()))?;

        let mut resolved = self.resolver.resolve(source)?;
        if let ResolvedSource::Buffer(data) = &resolved {
            if !self.engine.supports_buffer_source() {
                let data = data.clone();
                resolved = ResolvedSource::File(self.spill_to_cache(&data)?);
            }
        }

        self.duration = self.engine.prepare(&resolved)?.known();
        self.engine.set_looping(self.looping)?;
        self.apply_gains()?;
        Ok(())
    }

    /// Recompute channel gains from the effective volume and balance and
    /// push them to the engine.
    fn apply_gains(&mut self) -> Result<()> {
        let (left, right) = channel_gains(self.effective_volume(), self.balance);
        self.engine.set_channel_gains(left, right)?;
        Ok(())
    }

    fn emit_playback_ended(&mut self) {
        if let Some(handler) = self.on_playback_ended.as_mut() {
            handler();
        }
    }

    /// Write a buffer source to a uuid-named temp file for engines that
    /// cannot decode from memory. Reused across re-preparations.
    fn spill_to_cache(&mut self, data: &Bytes) -> Result<PathBuf> {
        if let Some(path) = &self.cache_path {
            return Ok(path.clone());
        }

        let path = std::env::temp_dir().join(format!("{}.audio", Uuid::new_v4()));
        std::fs::write(&path, data)?;
        debug!(path = %path.display(), "buffer source spilled to cache file");
        self.cache_path = Some(path.clone());
        Ok(path)
    }

    fn remove_cache_file(&mut self) {
        if let Some(path) = self.cache_path.take() {
            if let Err(err) = std::fs::remove_file(&path) {
                debug!(path = %path.display(), %err, "cache file cleanup failed");
            }
        }
    }

    #[cfg(test)]
    fn force_speed_change_in_flight(&self) {
        self.speed.in_flight.store(true, Ordering::Release);
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for AudioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPlayer")
            .field("state", &self.state)
            .field("duration", &self.duration)
            .field("volume", &self.volume)
            .field("balance", &self.balance)
            .field("speed", &self.speed.requested)
            .field("looping", &self.looping)
            .finish()
    }
}

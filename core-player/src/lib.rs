//! # Single-Stream Audio Playback Core
//!
//! Platform-agnostic playback state machine for one audio stream.
//!
//! ## Overview
//!
//! This crate handles:
//! - Playback commands (play, pause, stop, seek) over a host [`PlaybackEngine`]
//! - The destructive rate-change protocol (teardown / rebuild / restore)
//! - Position tracking independent of the engine's own reporting
//! - Audio focus arbitration (pause on interruption, duck, auto-resume)
//! - Volume and stereo balance via constant-power panning
//! - A microphone capture loop forwarding raw buffers to subscribers
//!
//! Hosts implement the traits in [`player_bridge`] and deliver system
//! callbacks (focus changes, end-of-playback) into the player on the same
//! serialized context as user commands.
//!
//! [`PlaybackEngine`]: player_bridge::PlaybackEngine

pub mod error;
pub mod focus;
pub mod options;
pub mod pan;
pub mod player;
pub mod stopwatch;
pub mod streamer;

pub use error::{PlayerError, Result};
pub use focus::{FocusArbitrator, FocusState, DUCKING_VOLUME_MULTIPLIER};
pub use options::{PlayerOptions, StreamerOptions};
pub use pan::channel_gains;
pub use player::{AudioPlayer, PlaybackState, MAX_SPEED, MIN_SPEED};
pub use stopwatch::AudioStopwatch;
pub use streamer::{AudioStreamer, StreamerState};

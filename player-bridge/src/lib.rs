//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (Android, iOS/macOS, Windows, desktop Linux).
//!
//! ## Traits
//!
//! ### Playback
//! - [`PlaybackEngine`](engine::PlaybackEngine) - Native decode/render pipeline
//! - [`SourceResolver`](source::SourceResolver) - Logical source to engine handle
//!
//! ### Platform Integration
//! - [`FocusService`](focus::FocusService) - OS audio focus arbitration
//! - [`CaptureDevice`](capture::CaptureDevice) - Microphone capture sessions
//!
//! ### Utilities
//! - [`MonotonicClock`](time::MonotonicClock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific errors to
//! `BridgeError` and provide actionable messages.
//!
//! ## Thread Safety
//!
//! Each player instance has a single logical owner context; bridge
//! implementations are driven from that context only and do not need
//! internal locking for calls coming from the core. Traits still require
//! `Send` so the owning player can move between threads.

pub mod capture;
pub mod engine;
pub mod error;
pub mod focus;
pub mod source;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use capture::{CaptureDevice, CaptureFormat};
pub use engine::{EngineDuration, PlaybackEngine};
pub use focus::{
    AudioContentType, AudioUsage, FocusAttributes, FocusChange, FocusRequestOutcome, FocusService,
};
pub use source::{FsResolver, PlaybackSource, ResolvedSource, SourceResolver};
pub use time::{MonotonicClock, SystemClock};

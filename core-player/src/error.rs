//! # Player Error Types
//!
//! Error types for playback and capture operations.

use player_bridge::BridgeError;
use thiserror::Error;

/// Errors that can occur during player operations.
#[derive(Error, Debug)]
pub enum PlayerError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// No usable audio source is set on the player.
    #[error("Invalid audio source: {0}")]
    InvalidSource(String),

    /// Neither a byte buffer, an existing file, nor a resolvable asset backs
    /// the source descriptor.
    #[error("Audio source not found: {0}")]
    SourceNotFound(String),

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// The platform rejected the exact playback rate value.
    ///
    /// Surfaced deterministically so the caller can react; the player never
    /// continues silently muted after a rejected rate.
    #[error("Playback rate not supported by the device: {0}")]
    UnsupportedSpeed(f64),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The underlying decode/render pipeline failed.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Capture device failed or is unavailable.
    #[error("Capture error: {0}")]
    Capture(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error occurred (e.g., while spilling a buffer to the temp cache).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    /// Returns `true` if this error concerns the configured source.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            PlayerError::InvalidSource(_) | PlayerError::SourceNotFound(_)
        )
    }

    /// Returns `true` if this error came from the platform engine.
    pub fn is_engine_error(&self) -> bool {
        matches!(self, PlayerError::Engine(_) | PlayerError::UnsupportedSpeed(_))
    }
}

impl From<BridgeError> for PlayerError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::SourceNotFound(msg) => PlayerError::SourceNotFound(msg),
            BridgeError::NotAvailable(msg) => PlayerError::SourceNotFound(msg),
            BridgeError::Io(err) => PlayerError::Io(err),
            other => PlayerError::Engine(other.to_string()),
        }
    }
}

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

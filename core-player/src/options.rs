//! # Player and Streamer Configuration
//!
//! Per-instance option types. Each player carries its own options; there is
//! no process-wide configuration.

use player_bridge::capture::CaptureFormat;
use player_bridge::focus::{AudioContentType, AudioUsage, FocusAttributes};
use serde::{Deserialize, Serialize};

/// Options for a single player instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerOptions {
    /// Whether the player manages audio focus automatically.
    ///
    /// When enabled (default), the player requests focus before starting and
    /// abandons it when paused or stopped, so it interacts correctly with
    /// phone calls and other apps. When disabled, the player never touches
    /// the focus service and the host keeps full control.
    #[serde(default = "default_manage_focus")]
    pub manage_focus: bool,

    /// Content type hint forwarded with focus requests.
    #[serde(default)]
    pub content_type: AudioContentType,

    /// Usage kind hint forwarded with focus requests.
    #[serde(default)]
    pub usage: AudioUsage,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            manage_focus: default_manage_focus(),
            content_type: AudioContentType::default(),
            usage: AudioUsage::default(),
        }
    }
}

impl PlayerOptions {
    /// The focus attributes this player requests with.
    pub fn focus_attributes(&self) -> FocusAttributes {
        FocusAttributes {
            content_type: self.content_type,
            usage: self.usage,
        }
    }
}

fn default_manage_focus() -> bool {
    true
}

/// Options for the microphone capture streamer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StreamerOptions {
    /// Capture PCM format requested from the device.
    #[serde(default)]
    pub format: CaptureFormat,
}

impl Default for StreamerOptions {
    fn default() -> Self {
        Self {
            format: CaptureFormat::default(),
        }
    }
}

impl StreamerOptions {
    /// Validate option values.
    pub fn validate(&self) -> Result<(), String> {
        if self.format.sample_rate == 0 {
            return Err("sample_rate must be > 0".to_string());
        }

        if self.format.channels == 0 || self.format.channels > 2 {
            return Err("channels must be 1 or 2".to_string());
        }

        if self.format.bit_depth != 8 && self.format.bit_depth != 16 {
            return Err("bit_depth must be 8 or 16".to_string());
        }

        Ok(())
    }
}

//! Audio focus service abstraction.
//!
//! Audio focus is the OS-level arbitration token granting an app priority to
//! play audio. The host implements [`FocusService`] over its platform API
//! (AudioManager focus requests, AVAudioSession interruptions, ...) and
//! delivers asynchronous [`FocusChange`] notifications back into the player
//! on the same serialized context as user commands.

use serde::{Deserialize, Serialize};

/// Content type hint forwarded to the platform audio session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioContentType {
    #[default]
    Unknown,
    Speech,
    Music,
    Movie,
    Sonification,
}

/// Usage kind hint forwarded to the platform audio session.
///
/// On older platform variants this selects the legacy output stream type
/// instead (media, alarm, notification, voice call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioUsage {
    #[default]
    Unknown,
    Media,
    Alarm,
    Notification,
    VoiceCommunication,
    Game,
}

/// Attributes describing the focus request to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusAttributes {
    /// Content type of the audio being played.
    pub content_type: AudioContentType,
    /// Intended usage of the audio stream.
    pub usage: AudioUsage,
}

/// Outcome of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequestOutcome {
    /// The system granted focus; playback has priority.
    Granted,
    /// The system denied focus (another app holds exclusive audio).
    Denied,
}

impl FocusRequestOutcome {
    /// Returns `true` when focus was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, FocusRequestOutcome::Granted)
    }
}

/// Asynchronous focus-change notification from the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusChange {
    /// Focus regained after a transient loss.
    Gain,
    /// Focus lost permanently; a fresh request is needed to play again.
    PermanentLoss,
    /// Focus lost temporarily (e.g., phone call); expected to return.
    TransientLoss,
    /// Focus lost temporarily but playback may continue at reduced volume.
    TransientLossCanDuck,
}

/// Host-side audio focus arbitration.
///
/// Implementations wrap the platform focus API for one player instance.
/// Focus-change notifications are delivered by the host calling back into
/// the player (`AudioPlayer::handle_focus_change`), serialized with user
/// commands.
pub trait FocusService: Send {
    /// Request permission to play with the given attributes.
    fn request_focus(&mut self, attributes: &FocusAttributes) -> FocusRequestOutcome;

    /// Give up the focus token. Safe to call when focus is not held.
    fn abandon_focus(&mut self);
}

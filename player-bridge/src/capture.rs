//! Microphone capture abstraction.
//!
//! [`CaptureDevice`] is the producer side of the capture streaming loop: the
//! host wraps its recording API (AudioRecord, AVAudioEngine input node, ...)
//! and the core's `AudioStreamer` pulls raw buffers from it and forwards
//! them to subscribers.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// PCM format for captured audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFormat {
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Bits per sample (8 or 16).
    pub bit_depth: u16,
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            bit_depth: 16,
        }
    }
}

/// Host recording device for one capture session.
///
/// ## Threading Model
///
/// Runs inside the streamer's producer task; methods are never called
/// concurrently.
#[async_trait]
pub trait CaptureDevice: Send {
    /// Returns `true` if the host has a usable capture device (microphone
    /// present and permission granted).
    fn can_capture(&self) -> bool;

    /// Open the device for the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is busy or the format is unsupported.
    async fn open(&mut self, format: CaptureFormat) -> Result<()>;

    /// Read the next chunk of raw PCM bytes.
    ///
    /// Returns `Ok(None)` when the device has been closed and no further
    /// data will arrive.
    async fn read_chunk(&mut self) -> Result<Option<Bytes>>;

    /// Stop capturing and release the device.
    async fn close(&mut self) -> Result<()>;

    /// The format the device is currently open with, if open.
    fn current_format(&self) -> Option<CaptureFormat>;
}

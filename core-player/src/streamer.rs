//! # Microphone Capture Streamer
//!
//! Producer loop that pulls raw PCM chunks from the host's
//! [`CaptureDevice`] and forwards them to a subscriber callback. Runs as a
//! pure async function; the host decides the execution context and stops
//! the loop through a cancellation token.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        CaptureDevice (Producer)         │
//! └────────────┬────────────────────────────┘
//!              │ raw PCM chunks
//!              ▼
//! ┌─────────────────────────────────────────┐
//! │       AudioStreamer::run (loop)         │
//! └────────────┬────────────────────────────┘
//!              │ Bytes
//!              ▼
//! ┌─────────────────────────────────────────┐
//! │         Subscriber callback             │
//! └─────────────────────────────────────────┘
//! ```

use crate::error::{PlayerError, Result};
use crate::options::StreamerOptions;
use bytes::Bytes;
use parking_lot::Mutex;
use player_bridge::capture::CaptureDevice;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Current state of the capture streamer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamerState {
    /// Not capturing.
    Idle,
    /// Actively capturing and forwarding chunks.
    Capturing,
}

/// Microphone capture service for one device.
pub struct AudioStreamer {
    device: Mutex<Box<dyn CaptureDevice>>,
    state: Mutex<StreamerState>,
    options: StreamerOptions,
}

impl AudioStreamer {
    /// Create a streamer over the host capture device.
    pub fn new(device: Box<dyn CaptureDevice>, options: StreamerOptions) -> Self {
        Self {
            device: Mutex::new(device),
            state: Mutex::new(StreamerState::Idle),
            options,
        }
    }

    /// Returns `true` while the capture loop is running.
    pub fn is_streaming(&self) -> bool {
        *self.state.lock() == StreamerState::Capturing
    }

    /// Whether the host can capture audio at all.
    pub fn can_stream(&self) -> bool {
        self.device.lock().can_capture()
    }

    /// The options this streamer captures with.
    pub fn options(&self) -> &StreamerOptions {
        &self.options
    }

    /// Run the capture loop, forwarding each chunk to `sink`.
    ///
    /// Returns without error when the host has no usable capture device or
    /// when a capture session is already running (both logged). The loop
    /// stops when `cancel` is triggered or the device reports end of
    /// stream; the device is closed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Capture`] when the options are invalid or the
    /// device fails while opening or reading.
    pub async fn run(
        &self,
        mut sink: impl FnMut(Bytes) + Send,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.options
            .validate()
            .map_err(PlayerError::Capture)?;

        let mut device = match self.device.try_lock() {
            Some(device) => device,
            None => {
                warn!("capture session already running");
                return Ok(());
            }
        };

        if !device.can_capture() {
            warn!("audio capture is not supported on this host");
            return Ok(());
        }

        // A device left open with stale options is torn down and reopened.
        match device.current_format() {
            Some(format) if format != self.options.format => {
                debug!(?format, requested = ?self.options.format, "reopening device for new format");
                device.close().await.map_err(|e| PlayerError::Capture(e.to_string()))?;
                device
                    .open(self.options.format)
                    .await
                    .map_err(|e| PlayerError::Capture(e.to_string()))?;
            }
            Some(_) => {}
            None => {
                device
                    .open(self.options.format)
                    .await
                    .map_err(|e| PlayerError::Capture(e.to_string()))?;
            }
        }

        *self.state.lock() = StreamerState::Capturing;
        info!(format = ?self.options.format, "capture started");

        let result = loop {
            if cancel.is_cancelled() {
                info!("capture cancelled");
                break Ok(());
            }

            match device.read_chunk().await {
                Ok(Some(chunk)) => sink(chunk),
                Ok(None) => {
                    info!("capture device closed the stream");
                    break Ok(());
                }
                Err(err) => break Err(PlayerError::Capture(err.to_string())),
            }
        };

        if let Err(err) = device.close().await {
            debug!(%err, "capture device close failed");
        }
        *self.state.lock() = StreamerState::Idle;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streamer_starts_idle() {
        struct NoDevice;

        #[async_trait::async_trait]
        impl CaptureDevice for NoDevice {
            fn can_capture(&self) -> bool {
                false
            }
            async fn open(
                &mut self,
                _format: player_bridge::CaptureFormat,
            ) -> player_bridge::error::Result<()> {
                Ok(())
            }
            async fn read_chunk(&mut self) -> player_bridge::error::Result<Option<Bytes>> {
                Ok(None)
            }
            async fn close(&mut self) -> player_bridge::error::Result<()> {
                Ok(())
            }
            fn current_format(&self) -> Option<player_bridge::CaptureFormat> {
                None
            }
        }

        let streamer = AudioStreamer::new(Box::new(NoDevice), StreamerOptions::default());
        assert!(!streamer.is_streaming());
        assert!(!streamer.can_stream());
    }
}

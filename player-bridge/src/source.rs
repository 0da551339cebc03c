//! Audio source descriptors and host-side source resolution.
//!
//! A [`PlaybackSource`] describes where encoded audio comes from without
//! prescribing how the platform opens it. The host supplies a
//! [`SourceResolver`] that turns the logical descriptor into something the
//! audio engine can consume; [`FsResolver`] covers the common desktop case
//! (in-memory buffers and local files).

use crate::error::{BridgeError, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Logical source of encoded audio for a single player instance.
///
/// Exactly one variant is active per player; replacing the source fully
/// resets playback state.
#[derive(Debug, Clone)]
pub enum PlaybackSource {
    /// Encoded audio held entirely in memory.
    Buffer {
        /// Raw encoded bytes (not PCM).
        data: Bytes,
    },

    /// Audio file accessible through the host filesystem.
    File {
        /// Absolute path to the audio file.
        path: PathBuf,
    },

    /// Platform-bundled asset addressed by logical name.
    Asset {
        /// Asset identifier understood by the host resolver.
        name: String,
    },
}

impl PlaybackSource {
    /// Convenience constructor for an in-memory source.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffer { data: data.into() }
    }

    /// Convenience constructor for a file source.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    /// Convenience constructor for an asset source.
    pub fn from_asset(name: impl Into<String>) -> Self {
        Self::Asset { name: name.into() }
    }

    /// Returns `true` if the audio data is already in memory.
    pub fn is_buffer(&self) -> bool {
        matches!(self, PlaybackSource::Buffer { .. })
    }

    /// Returns the size of the encoded data in bytes, if known.
    pub fn estimated_size(&self) -> Option<usize> {
        match self {
            PlaybackSource::Buffer { data } => Some(data.len()),
            _ => None,
        }
    }
}

/// A source after host resolution, ready to hand to the engine.
#[derive(Debug, Clone)]
pub enum ResolvedSource {
    /// Encoded bytes the engine can decode directly from memory.
    Buffer(Bytes),
    /// A readable file on the host filesystem.
    File(PathBuf),
    /// An opaque platform handle (e.g., an asset file descriptor token).
    Handle(String),
}

/// Resolves logical source descriptors into engine-consumable handles.
///
/// Implementations should fail with [`BridgeError::SourceNotFound`] when
/// neither a byte buffer, an existing file, nor a resolvable asset backs the
/// descriptor.
pub trait SourceResolver: Send + Sync {
    /// Resolve a logical source into a concrete handle.
    fn resolve(&self, source: &PlaybackSource) -> Result<ResolvedSource>;
}

/// Default resolver backed by the local filesystem.
///
/// Buffers pass through untouched, file paths must exist on disk, and assets
/// are not supported (hosts with bundled assets provide their own resolver).
#[derive(Debug, Clone, Default)]
pub struct FsResolver;

impl SourceResolver for FsResolver {
    fn resolve(&self, source: &PlaybackSource) -> Result<ResolvedSource> {
        match source {
            PlaybackSource::Buffer { data } => {
                if data.is_empty() {
                    return Err(BridgeError::SourceNotFound("empty audio buffer".into()));
                }
                Ok(ResolvedSource::Buffer(data.clone()))
            }
            PlaybackSource::File { path } => {
                if !Path::new(path).is_file() {
                    return Err(BridgeError::SourceNotFound(path.display().to_string()));
                }
                Ok(ResolvedSource::File(path.clone()))
            }
            PlaybackSource::Asset { name } => Err(BridgeError::NotAvailable(format!(
                "asset resolution requires a host resolver: {name}"
            ))),
        }
    }
}

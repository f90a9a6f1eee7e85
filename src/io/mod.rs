//! Bounded loading of image files.
//!
//! The image producer is an external tool; this module only turns its output
//! file into an owned byte buffer. Files are memory-mapped, checked against
//! [`IOLimits`], and copied out so the map and handle are released before
//! decoding starts.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Resource limits applied when loading an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
    /// How much of the file is copied out. The header and its export bitmap
    /// sit at the start, so larger files are truncated to this prefix.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_read_bytes: 10 * 1024 * 1024,  // 10MB
        }
    }
}

/// An image held in memory, ready to decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    path: Option<PathBuf>,
    data: Bytes,
}

impl RawImage {
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            path: None,
            data: data.into(),
        }
    }

    /// Where the image was loaded from, if it came from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Load an image file, enforcing `limits`.
///
/// # Errors
///
/// Returns `IoError::FileTooLarge` if the file exceeds `limits.max_file_size`,
/// or `IoError::StdIo` if it cannot be opened or mapped.
pub fn load_image<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<RawImage> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    debug!(
        path = %path.display(),
        size = file_size,
        limits.max_file_size = limits.max_file_size,
        "Loading image"
    );

    if file_size > limits.max_file_size {
        warn!(
            path = %path.display(),
            size = file_size,
            limit = limits.max_file_size,
            "File is too large"
        );
        return Err(IoError::FileTooLarge {
            limit: limits.max_file_size,
            found: file_size,
        });
    }

    // memmap cannot map empty files.
    let data = if file_size == 0 {
        Bytes::new()
    } else {
        // Safety: read-only map of a regular file, dropped before returning.
        let map = unsafe { Mmap::map(&file)? };
        let len = std::cmp::min(map.len() as u64, limits.max_read_bytes) as usize;
        if len < map.len() {
            debug!(path = %path.display(), kept = len, "Truncating image to read limit");
        }
        Bytes::copy_from_slice(&map[..len])
    };

    trace!(path = %path.display(), len = data.len(), "Image loaded");

    Ok(RawImage {
        path: Some(path.to_path_buf()),
        data,
    })
}

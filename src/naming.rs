//! Artifact naming.
//!
//! Uploads get a timestamp prefix (`1700000000_photo.jpg`), compressed outputs
//! get a marker and timestamp before the extension
//! (`photo_compressed_1700000000.jpg`). Uniqueness relies on whole-second
//! timestamps only: two uploads of the same name within one second produce the
//! same name. Callers create files exclusively so such a collision fails
//! instead of overwriting.

use crate::constants::COMPRESSED_MARKER;
use crate::formats::split_extension;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of whole-second Unix timestamps.
pub trait Clock: Send + Sync {
    fn unix_seconds(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> i64 {
        self.0
    }
}

/// Name under which a freshly uploaded file is stored.
pub fn upload_name(original: &str, timestamp: i64) -> String {
    format!("{}_{}", timestamp, original)
}

/// Name for the compressed counterpart of `original`.
pub fn compressed_name(original: &str, timestamp: i64) -> String {
    let (stem, ext) = split_extension(original);
    format!("{}{}{}{}", stem, COMPRESSED_MARKER, timestamp, ext)
}

//! Flat-directory artifact storage.
//!
//! Uploads and compressed outputs live in two separate directories; the
//! directory listing is the only index.

use crate::constants::DOWNLOAD_URL_PREFIX;
use crate::formats::FormatValidator;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// A file held in one of the artifact directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub download_url: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    upload_dir: PathBuf,
    compressed_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(upload_dir: impl Into<PathBuf>, compressed_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            compressed_dir: compressed_dir.into(),
        }
    }

    /// Create both directories if missing.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.upload_dir)?;
        fs::create_dir_all(&self.compressed_dir)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn compressed_dir(&self) -> &Path {
        &self.compressed_dir
    }

    pub fn upload_path(&self, name: &str) -> PathBuf {
        self.upload_dir.join(name)
    }

    pub fn compressed_path(&self, name: &str) -> PathBuf {
        self.compressed_dir.join(name)
    }

    /// Persist upload bytes verbatim. Fails with `AlreadyExists` rather than
    /// overwriting an existing upload.
    pub fn write_upload(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.upload_dir)?;
        let path = self.upload_path(name);
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        Ok(path)
    }

    pub fn upload_exists(&self, name: &str) -> bool {
        self.upload_path(name).is_file()
    }

    pub fn remove_upload(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.upload_path(name))
    }

    /// Compressed artifacts accepted by `validator`, sorted by name.
    pub fn list_compressed(&self, validator: &FormatValidator) -> io::Result<Vec<StoredImage>> {
        let mut images = Vec::new();

        for entry in WalkDir::new(&self.compressed_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !validator.is_supported(&name) {
                continue;
            }
            match entry.metadata() {
                Ok(metadata) => images.push(stored_image(name, &metadata)),
                // Removed between listing and stat.
                Err(e) => warn!("Skipping {:?}: {}", entry.path(), e),
            }
        }

        Ok(images)
    }

    /// Look up a compressed artifact, `None` if absent.
    pub fn compressed_entry(&self, name: &str) -> io::Result<Option<StoredImage>> {
        match fs::metadata(self.compressed_path(name)) {
            Ok(metadata) if metadata.is_file() => {
                Ok(Some(stored_image(name.to_string(), &metadata)))
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns `false` when there was nothing to delete.
    pub fn delete_compressed(&self, name: &str) -> io::Result<bool> {
        match fs::remove_file(self.compressed_path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn stored_image(name: String, metadata: &fs::Metadata) -> StoredImage {
    let modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    StoredImage {
        download_url: format!("{}{}", DOWNLOAD_URL_PREFIX, name),
        size: metadata.len(),
        modified,
        name,
    }
}

//! Upload and compression orchestration.
//!
//! Three request shapes are composed here from the format gate, the naming
//! rules, the artifact store and an [`ImageService`]: upload-only,
//! compress-existing and upload-and-compress. Everything is synchronous; the
//! HTTP layer runs each call on a blocking worker.

use crate::constants::{COMPRESSED_URL_PREFIX, UPLOAD_URL_PREFIX};
use crate::error::CompressionError;
use crate::formats::FormatValidator;
use crate::naming::{compressed_name, upload_name, Clock, SystemClock};
use crate::processing::{CompressionOptions, CompressionResult, ImageService};
use crate::storage::{ArtifactStore, StoredImage};
use crate::utils::format_file_size;
use crate::validation::{base_file_name, is_safe_artifact_name, within_upload_limit};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Unsupported file format, supported formats: {}", .supported.join(", "))]
    UnsupportedExtension {
        filename: String,
        supported: Vec<String>,
    },

    #[error("File too large: {size} bytes. Maximum allowed: {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Image dimensions {width}x{height} exceed the maximum of {max}x{max}")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },

    #[error("File does not exist: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Compression failed: {0}")]
    Compression(#[from] CompressionError),

    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),
}

/// How the HTTP layer should classify a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidFileName(_)
            | PipelineError::UnsupportedExtension { .. }
            | PipelineError::FileTooLarge { .. }
            | PipelineError::DimensionsTooLarge { .. } => ErrorKind::Validation,
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::AlreadyExists(_) => ErrorKind::Conflict,
            PipelineError::Compression(_) | PipelineError::Storage(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// An incoming file as received from the transport.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub filename: &'a str,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Name as sent by the client, directories stripped
    pub original_name: String,
    /// Name under the upload directory
    pub stored_name: String,
    pub size: u64,
    pub content_type: String,
    pub uploaded_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionReport {
    pub source_name: String,
    pub result: CompressionResult,
    pub options: CompressionOptions,
    pub original_url: String,
    pub compressed_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCompressReport {
    pub upload: UploadReceipt,
    pub compression: CompressionReport,
}

pub struct Pipeline {
    service: Arc<dyn ImageService>,
    validator: FormatValidator,
    store: ArtifactStore,
    clock: Arc<dyn Clock>,
    max_upload_bytes: u64,
}

impl Pipeline {
    pub fn new(
        service: Arc<dyn ImageService>,
        store: ArtifactStore,
        max_upload_bytes: u64,
    ) -> Self {
        let validator = FormatValidator::new(service.supported_formats());
        Self {
            service,
            validator,
            store,
            clock: Arc::new(SystemClock),
            max_upload_bytes,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn supported_formats(&self) -> &[String] {
        self.service.supported_formats()
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    fn unsupported(&self, filename: &str) -> PipelineError {
        PipelineError::UnsupportedExtension {
            filename: filename.to_string(),
            supported: self.service.supported_formats().to_vec(),
        }
    }

    /// Store an upload verbatim without compressing it.
    pub fn upload(&self, request: UploadRequest<'_>) -> Result<UploadReceipt> {
        let original_name = base_file_name(request.filename);
        if !is_safe_artifact_name(original_name) {
            return Err(PipelineError::InvalidFileName(request.filename.to_string()));
        }
        if !self.service.validate_image_format(original_name) {
            return Err(self.unsupported(original_name));
        }

        let size = request.bytes.len() as u64;
        if !within_upload_limit(size, self.max_upload_bytes) {
            return Err(PipelineError::FileTooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let uploaded_at = self.clock.unix_seconds();
        let stored_name = upload_name(original_name, uploaded_at);
        self.store
            .write_upload(&stored_name, request.bytes)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => PipelineError::AlreadyExists(stored_name.clone()),
                _ => PipelineError::Storage(e),
            })?;

        info!("Stored upload {} ({})", stored_name, format_file_size(size));

        Ok(UploadReceipt {
            original_name: original_name.to_string(),
            stored_name,
            size,
            content_type: request
                .content_type
                .unwrap_or("application/octet-stream")
                .to_string(),
            uploaded_at,
        })
    }

    /// Compress a file previously stored by [`Pipeline::upload`].
    pub fn compress_existing(
        &self,
        filename: &str,
        options: &CompressionOptions,
    ) -> Result<CompressionReport> {
        if !is_safe_artifact_name(filename) {
            return Err(PipelineError::InvalidFileName(filename.to_string()));
        }
        if !self.service.validate_image_format(filename) {
            return Err(self.unsupported(filename));
        }
        if !self.store.upload_exists(filename) {
            return Err(PipelineError::NotFound(filename.to_string()));
        }

        let output_name = compressed_name(filename, self.clock.unix_seconds());
        let input_path = self.store.upload_path(filename);
        let output_path = self.store.compressed_path(&output_name);

        let result = self
            .service
            .compress_image(&input_path, &output_path, options)
            .map_err(|e| match e {
                CompressionError::OutputExists(_) => {
                    PipelineError::AlreadyExists(output_name.clone())
                }
                CompressionError::FileNotFound(_) => PipelineError::NotFound(filename.to_string()),
                CompressionError::InvalidDimensions(width, height, max) => {
                    PipelineError::DimensionsTooLarge { width, height, max }
                }
                other => PipelineError::Compression(other),
            })?;

        Ok(CompressionReport {
            source_name: filename.to_string(),
            original_url: format!("{}{}", UPLOAD_URL_PREFIX, filename),
            compressed_url: format!("{}{}", COMPRESSED_URL_PREFIX, result.output_name),
            result,
            options: *options,
        })
    }

    /// Upload then compress. A failed compression removes the upload again.
    pub fn upload_and_compress(
        &self,
        request: UploadRequest<'_>,
        options: &CompressionOptions,
    ) -> Result<UploadCompressReport> {
        let upload = self.upload(request)?;

        match self.compress_existing(&upload.stored_name, options) {
            Ok(compression) => Ok(UploadCompressReport {
                upload,
                compression,
            }),
            Err(e) => {
                warn!(
                    "Compression of {} failed, removing upload: {}",
                    upload.stored_name, e
                );
                if let Err(remove_err) = self.store.remove_upload(&upload.stored_name) {
                    error!(
                        "Failed to remove orphaned upload {}: {}",
                        upload.stored_name, remove_err
                    );
                }
                Err(e)
            }
        }
    }

    pub fn list_compressed(&self) -> Result<Vec<StoredImage>> {
        Ok(self.store.list_compressed(&self.validator)?)
    }

    /// Resolve a compressed artifact for download.
    pub fn open_compressed(&self, filename: &str) -> Result<(StoredImage, PathBuf)> {
        if !is_safe_artifact_name(filename) {
            return Err(PipelineError::InvalidFileName(filename.to_string()));
        }
        match self.store.compressed_entry(filename)? {
            Some(entry) => Ok((entry, self.store.compressed_path(filename))),
            None => Err(PipelineError::NotFound(filename.to_string())),
        }
    }

    pub fn delete_compressed(&self, filename: &str) -> Result<()> {
        if !is_safe_artifact_name(filename) {
            return Err(PipelineError::InvalidFileName(filename.to_string()));
        }
        if self.store.delete_compressed(filename)? {
            info!("Deleted compressed image {}", filename);
            Ok(())
        } else {
            Err(PipelineError::NotFound(filename.to_string()))
        }
    }
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),
}

impl CompressionError {
    /// Caller-facing description that never includes filesystem paths.
    pub fn public_message(&self) -> String {
        match self {
            CompressionError::Io(_) | CompressionError::DirectoryCreationFailed(_) => {
                "file could not be read or written".to_string()
            }
            CompressionError::Decode(_) => "image data could not be decoded".to_string(),
            CompressionError::Encode(_) | CompressionError::PngOptimization(_) => {
                "image could not be encoded".to_string()
            }
            CompressionError::InvalidDimensions(w, h, max) => {
                format!("image dimensions {w}x{h} exceed the maximum of {max}x{max}")
            }
            CompressionError::UnsupportedFormat(fmt) => format!("unsupported image format: {fmt}"),
            CompressionError::FileNotFound(_) => "source file does not exist".to_string(),
            CompressionError::OutputExists(_) => "output file already exists".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;

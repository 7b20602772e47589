//! Image format handling
//!
//! Two separate checks live here: the extension gate applied to user-supplied
//! file names, and content sniffing of the actual bytes. A file can pass the
//! first and still fail the second.
use crate::constants::DEFAULT_SUPPORTED_EXTENSIONS;
use crate::error::{CompressionError, Result};
use image::ImageFormat;
use std::fmt;

/// Formats the compression engine can re-encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Lossy, re-encoded at the requested quality
    Jpeg,
    /// Lossless, quality has no effect
    Png,
}

impl SourceFormat {
    /// Detect the format from magic bytes, ignoring any file name.
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Jpeg) => Ok(SourceFormat::Jpeg),
            Ok(ImageFormat::Png) => Ok(SourceFormat::Png),
            Ok(other) => Err(CompressionError::UnsupportedFormat(
                format!("{:?}", other).to_lowercase(),
            )),
            Err(e) => Err(CompressionError::Decode(e)),
        }
    }

    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Png => ImageFormat::Png,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
        };
        write!(f, "{}", name)
    }
}

/// Split a file name into stem and extension, the extension keeping its dot.
///
/// Only the final path component is considered, so `"a.b/c"` has no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if !filename[idx..].contains(|c| c == '/' || c == '\\') => {
            (&filename[..idx], &filename[idx..])
        }
        _ => (filename, ""),
    }
}

/// Extension gate for uploaded and listed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatValidator {
    supported: Vec<String>,
}

impl FormatValidator {
    /// Build a validator from extensions such as `".jpg"` or `"PNG"`.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut supported: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().to_lowercase();
            if ext.is_empty() || ext == "." {
                continue;
            }
            let ext = if ext.starts_with('.') { ext } else { format!(".{}", ext) };
            if !supported.contains(&ext) {
                supported.push(ext);
            }
        }
        Self { supported }
    }

    pub fn is_supported(&self, filename: &str) -> bool {
        let (_, ext) = split_extension(filename);
        if ext.is_empty() {
            return false;
        }
        let ext = ext.to_lowercase();
        self.supported.iter().any(|s| *s == ext)
    }

    pub fn supported_formats(&self) -> &[String] {
        &self.supported
    }

    /// Comma separated list for error messages.
    pub fn describe(&self) -> String {
        self.supported.join(", ")
    }
}

impl Default for FormatValidator {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPORTED_EXTENSIONS.iter().copied())
    }
}

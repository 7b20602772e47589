use crate::constants::{
    DEFAULT_PNG_OPTIMIZATION_LEVEL, DEFAULT_QUALITY, MAX_IMAGE_DIMENSION,
    MAX_PNG_OPTIMIZATION_LEVEL, MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{CompressionError, Result};
use crate::formats::{FormatValidator, SourceFormat};
use crate::utils::{format_file_size, format_ratio};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Per-request compression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub quality: u8,
    /// Target width in pixels, 0 leaves it unconstrained
    pub width: u32,
    /// Target height in pixels, 0 leaves it unconstrained
    pub height: u32,
    pub keep_aspect: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            width: 0,
            height: 0,
            keep_aspect: true,
        }
    }
}

impl CompressionOptions {
    /// Out-of-range quality falls back to the default instead of failing.
    pub fn new(quality: i64, width: u32, height: u32, keep_aspect: bool) -> Self {
        Self {
            quality: effective_quality(quality),
            width,
            height,
            keep_aspect,
        }
    }

    /// Build options from raw form values. Missing or unparseable fields keep
    /// their defaults.
    pub fn from_form(
        quality: Option<&str>,
        width: Option<&str>,
        height: Option<&str>,
        keep_aspect: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        let quality = quality
            .and_then(|q| q.trim().parse::<i64>().ok())
            .map(effective_quality)
            .unwrap_or(defaults.quality);
        let width = width
            .and_then(|w| w.trim().parse::<u32>().ok())
            .unwrap_or(defaults.width);
        let height = height
            .and_then(|h| h.trim().parse::<u32>().ok())
            .unwrap_or(defaults.height);
        let keep_aspect = keep_aspect
            .and_then(|k| parse_bool(k.trim()))
            .unwrap_or(defaults.keep_aspect);

        Self {
            quality,
            width,
            height,
            keep_aspect,
        }
    }

    pub fn wants_resize(&self) -> bool {
        self.width > 0 || self.height > 0
    }
}

fn effective_quality(quality: i64) -> u8 {
    if (MIN_QUALITY as i64..=MAX_QUALITY as i64).contains(&quality) {
        quality as u8
    } else {
        DEFAULT_QUALITY
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Outcome of a successful compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionResult {
    pub original_size: u64,
    pub compressed_size: u64,
    pub output_name: String,
    /// Compressed size relative to the original, e.g. `"73.2%"`
    pub ratio: String,
    pub format: SourceFormat,
    pub width: u32,
    pub height: u32,
}

/// Encoder tuning that is fixed for the lifetime of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub png_optimization_level: u8,
    pub max_dimension: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            png_optimization_level: DEFAULT_PNG_OPTIMIZATION_LEVEL,
            max_dimension: MAX_IMAGE_DIMENSION,
        }
    }
}

/// Capability interface for the compression engine.
pub trait ImageService: Send + Sync {
    fn compress_image(
        &self,
        input_path: &Path,
        output_path: &Path,
        options: &CompressionOptions,
    ) -> Result<CompressionResult>;

    fn supported_formats(&self) -> &[String];

    fn validate_image_format(&self, filename: &str) -> bool;
}

/// Engine backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalImageService {
    validator: FormatValidator,
    settings: EncoderSettings,
}

impl LocalImageService {
    pub fn new(validator: FormatValidator, settings: EncoderSettings) -> Self {
        Self {
            validator,
            settings,
        }
    }

    pub fn validator(&self) -> &FormatValidator {
        &self.validator
    }
}

impl ImageService for LocalImageService {
    fn compress_image(
        &self,
        input_path: &Path,
        output_path: &Path,
        options: &CompressionOptions,
    ) -> Result<CompressionResult> {
        process_image_pipeline(input_path, output_path, options, &self.settings)
    }

    fn supported_formats(&self) -> &[String] {
        self.validator.supported_formats()
    }

    fn validate_image_format(&self, filename: &str) -> bool {
        self.validator.is_supported(filename)
    }
}

/// Core image processing pipeline: load -> resize -> encode -> persist.
///
/// # Arguments
/// * `input_path` - Path to the input image file
/// * `output_path` - Destination; must not exist yet
/// * `options` - Quality and resize options
/// * `settings` - Encoder tuning
///
/// # Returns
/// * `Ok(CompressionResult)` - Sizes, ratio and output dimensions
/// * `Err(CompressionError)` - If any step fails. No output file is left
///   behind and the input is never modified.
pub fn process_image_pipeline(
    input_path: &Path,
    output_path: &Path,
    options: &CompressionOptions,
    settings: &EncoderSettings,
) -> Result<CompressionResult> {
    let (mut img, format, original_size) =
        load_image_with_metadata(input_path, settings.max_dimension)?;
    debug!(
        "Loaded {:?}: {} {}x{} ({})",
        input_path,
        format,
        img.width(),
        img.height(),
        format_file_size(original_size)
    );

    resize_image(&mut img, options, settings.max_dimension)?;

    let encoded = encode_image(&img, format, options, settings)?;
    let compressed_size = persist_output(output_path, &encoded)?;

    let output_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ratio = format_ratio(original_size, compressed_size);

    info!(
        "Compressed {} -> {} ({} -> {}, {})",
        input_path.display(),
        output_name,
        format_file_size(original_size),
        format_file_size(compressed_size),
        ratio
    );

    Ok(CompressionResult {
        original_size,
        compressed_size,
        output_name,
        ratio,
        format,
        width: img.width(),
        height: img.height(),
    })
}

/// Reads and decodes an image, sniffing its format from the bytes.
///
/// # Returns
/// * `Ok((image, format, file_size))`
/// * `Err(CompressionError::FileNotFound)` if the input is absent
/// * `Err(CompressionError::UnsupportedFormat)` for recognised formats other than JPEG/PNG
/// * `Err(CompressionError::Decode)` for unrecognised or corrupt data
pub fn load_image_with_metadata(
    input_path: &Path,
    max_dimension: u32,
) -> Result<(DynamicImage, SourceFormat, u64)> {
    let metadata = fs::metadata(input_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CompressionError::FileNotFound(input_path.to_path_buf()),
        _ => CompressionError::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(CompressionError::FileNotFound(input_path.to_path_buf()));
    }
    let file_size = metadata.len();

    let bytes = fs::read(input_path)?;
    let format = SourceFormat::detect(&bytes)?;

    let img = ImageReader::with_format(Cursor::new(&bytes), format.to_image_format())
        .decode()
        .map_err(CompressionError::Decode)?;

    let (width, height) = img.dimensions();
    if width > max_dimension || height > max_dimension {
        return Err(CompressionError::InvalidDimensions(
            width,
            height,
            max_dimension,
        ));
    }

    Ok((img, format, file_size))
}

/// Target dimensions chosen for a source image, `None` when no resize applies.
pub fn plan_resize(source: (u32, u32), options: &CompressionOptions) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    let (target_w, target_h) = (options.width, options.height);

    if !options.wants_resize() || src_w == 0 || src_h == 0 {
        return None;
    }

    let planned = match (target_w > 0, target_h > 0) {
        (true, true) if options.keep_aspect => {
            // Fit inside the box, never enlarging.
            if src_w <= target_w && src_h <= target_h {
                return None;
            }
            let src_aspect = src_w as f64 / src_h as f64;
            let box_aspect = target_w as f64 / target_h as f64;
            if src_aspect > box_aspect {
                (target_w, scaled(target_w as f64 / src_aspect))
            } else {
                (scaled(target_h as f64 * src_aspect), target_h)
            }
        }
        (true, true) => (target_w, target_h),
        (true, false) => (
            target_w,
            scaled(src_h as f64 * target_w as f64 / src_w as f64),
        ),
        (false, true) => (
            scaled(src_w as f64 * target_h as f64 / src_h as f64),
            target_h,
        ),
        (false, false) => return None,
    };

    if planned == source {
        None
    } else {
        Some(planned)
    }
}

fn scaled(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Applies the resize strategy selected by `plan_resize` with Lanczos3 resampling.
///
/// A planned size above `max_dimension` on either side is rejected before
/// any pixel buffer is allocated.
pub fn resize_image(
    img: &mut DynamicImage,
    options: &CompressionOptions,
    max_dimension: u32,
) -> Result<()> {
    if let Some((w, h)) = plan_resize(img.dimensions(), options) {
        if w > max_dimension || h > max_dimension {
            return Err(CompressionError::InvalidDimensions(w, h, max_dimension));
        }
        debug!("Resizing {}x{} -> {}x{}", img.width(), img.height(), w, h);
        *img = img.resize_exact(w, h, FilterType::Lanczos3);
    }
    Ok(())
}

/// Encodes into memory using the source format.
pub fn encode_image(
    img: &DynamicImage,
    format: SourceFormat,
    options: &CompressionOptions,
    settings: &EncoderSettings,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    match format {
        SourceFormat::Jpeg => {
            let quality = effective_quality(options.quality as i64);
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            match img {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => {
                    img.write_with_encoder(encoder)
                }
                _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder),
            }
            .map_err(CompressionError::Encode)?;
            Ok(buf)
        }
        SourceFormat::Png => {
            img.write_with_encoder(PngEncoder::new(&mut buf))
                .map_err(CompressionError::Encode)?;

            let level = settings
                .png_optimization_level
                .min(MAX_PNG_OPTIMIZATION_LEVEL);
            let oxipng_options = oxipng::Options::from_preset(level);
            oxipng::optimize_from_memory(&buf, &oxipng_options)
                .map_err(|e| CompressionError::PngOptimization(e.to_string()))
        }
    }
}

/// Writes `bytes` to `output_path` through a temp file in the same directory.
///
/// The destination is created exclusively; an existing file is never
/// replaced. Returns the size of the written file.
pub fn persist_output(output_path: &Path, bytes: &[u8]) -> Result<u64> {
    let parent: PathBuf = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .map_err(|_| CompressionError::DirectoryCreationFailed(parent.clone()))?;

    let mut temp = NamedTempFile::new_in(&parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    // Dropping the temp file on failure removes it.
    temp.persist_noclobber(output_path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            CompressionError::OutputExists(output_path.to_path_buf())
        } else {
            CompressionError::Io(e.error)
        }
    })?;

    Ok(fs::metadata(output_path)?.len())
}

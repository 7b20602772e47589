pub const DEFAULT_QUALITY: u8 = 85;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Upload ceiling in bytes (10 MiB). A body of exactly this size is accepted.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Slack added on top of the upload ceiling for multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub const MAX_IMAGE_DIMENSION: u32 = 16384;

/// oxipng preset used for the lossless PNG pass (0 fastest, 6 smallest).
pub const DEFAULT_PNG_OPTIMIZATION_LEVEL: u8 = 2;
pub const MAX_PNG_OPTIMIZATION_LEVEL: u8 = 6;

pub const DEFAULT_SUPPORTED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

pub const COMPRESSED_MARKER: &str = "_compressed_";

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_COMPRESSED_DIR: &str = "compressed";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// Public URL prefixes for stored artifacts
pub const UPLOAD_URL_PREFIX: &str = "/api/uploads/";
pub const COMPRESSED_URL_PREFIX: &str = "/api/static/";
pub const DOWNLOAD_URL_PREFIX: &str = "/api/v1/images/download/";

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-squeeze-server",
    about = "HTTP service for uploading and compressing JPEG and PNG images",
    long_about = "img-squeeze-server accepts image uploads over HTTP, optionally resizes and \
                  recompresses them, and serves the results for download. JPEG output is \
                  re-encoded at a configurable quality; PNG output is encoded losslessly and \
                  optimized with oxipng.",
    version,
    after_help = "EXAMPLES:\n  \
    img-squeeze-server --port 8080\n  \
    img-squeeze-server --config ./config.toml -v\n  \
    img-squeeze-server --upload-dir /data/uploads --compressed-dir /data/compressed\n  \
    img-squeeze-server --print-config > config.toml"
)]
pub struct Args {
    #[arg(
        short = 'c',
        long,
        help = "Path to a TOML configuration file",
        long_help = "Path to a TOML configuration file. When omitted, ./config.toml is used \
                     if present, otherwise built-in defaults."
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to bind (default: 0.0.0.0)")]
    pub host: Option<String>,

    #[arg(short = 'p', long, help = "Port to listen on (default: 8080)")]
    pub port: Option<u16>,

    #[arg(long, help = "Directory for raw uploads (default: uploads)")]
    pub upload_dir: Option<PathBuf>,

    #[arg(long, help = "Directory for compressed images (default: compressed)")]
    pub compressed_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Maximum upload size in bytes (default: 10485760)",
        long_help = "Maximum upload size in bytes. A file of exactly this size is accepted; \
                     anything larger is rejected before it is written."
    )]
    pub max_upload_bytes: Option<u64>,

    #[arg(short = 'v', long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(short = 'q', long, help = "Only log warnings and errors")]
    pub quiet: bool,

    #[arg(long, help = "Print the effective configuration as TOML and exit")]
    pub print_config: bool,
}

impl Args {
    /// Apply command line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.upload_dir {
            config.storage.upload_dir = dir.clone();
        }
        if let Some(dir) = &self.compressed_dir {
            config.storage.compressed_dir = dir.clone();
        }
        if let Some(limit) = self.max_upload_bytes {
            config.images.max_upload_bytes = limit;
        }
    }
}

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod logger;
pub mod naming;
pub mod pipeline;
pub mod processing;
pub mod storage;
pub mod users;
pub mod utils;
pub mod validation;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{CompressionError, Result};
pub use formats::{FormatValidator, SourceFormat};
pub use naming::{compressed_name, upload_name, Clock, FixedClock, SystemClock};
pub use pipeline::{
    CompressionReport, Pipeline, PipelineError, UploadCompressReport, UploadReceipt,
    UploadRequest,
};
pub use processing::{
    encode_image, load_image_with_metadata, plan_resize, process_image_pipeline, resize_image,
    CompressionOptions, CompressionResult, EncoderSettings, ImageService, LocalImageService,
};
pub use storage::{ArtifactStore, StoredImage};
pub use users::{InMemoryUserStore, User, UserError, UserStore};

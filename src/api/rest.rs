//! Axum REST API handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::dto::*;
use super::error::{ApiError, Envelope};
use super::extract::ImageForm;
use crate::config::Config;
use crate::constants::{MAX_IMAGE_DIMENSION, MULTIPART_OVERHEAD_BYTES};
use crate::formats::FormatValidator;
use crate::pipeline::{self, Pipeline, UploadRequest};
use crate::processing::{EncoderSettings, LocalImageService};
use crate::storage::ArtifactStore;
use crate::users::{InMemoryUserStore, UserError, UserStore};
use crate::utils::format_limit_mb;

/// Application state shared across handlers
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub users: Arc<dyn UserStore>,
    pub start_time: Instant,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: Pipeline, users: Arc<dyn UserStore>, request_timeout: Duration) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            users,
            start_time: Instant::now(),
            request_timeout,
        }
    }

    /// Wire the local compression engine and artifact store from configuration.
    /// Directories are not created here; see [`ArtifactStore::ensure_dirs`].
    pub fn from_config(config: &Config) -> Self {
        let settings = EncoderSettings {
            png_optimization_level: config.images.png_optimization_level,
            max_dimension: MAX_IMAGE_DIMENSION,
        };
        let validator = FormatValidator::new(&config.images.supported_extensions);
        let service = LocalImageService::new(validator, settings);
        let store = ArtifactStore::new(
            config.storage.upload_dir.clone(),
            config.storage.compressed_dir.clone(),
        );
        let pipeline = Pipeline::new(Arc::new(service), store, config.images.max_upload_bytes);

        Self::new(
            pipeline,
            Arc::new(InMemoryUserStore::seeded()),
            Duration::from_secs(config.server.request_timeout_secs),
        )
    }
}

/// Create the REST API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_dir = state.pipeline.store().upload_dir().to_path_buf();
    let compressed_dir = state.pipeline.store().compressed_dir().to_path_buf();
    let body_limit = usize::try_from(state.pipeline.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        // Image operations
        .route("/api/upload", post(upload_handler))
        .route("/api/compress", post(compress_handler))
        .route("/api/upload-compress", post(upload_compress_handler))
        .route("/api/v1/images/compress", post(upload_compress_handler))
        .route("/api/v1/images/formats", get(formats_handler))
        .route("/api/v1/images/list", get(list_images_handler))
        .route("/api/v1/images/download/:filename", get(download_handler))
        .route("/api/v1/images/:filename", delete(delete_image_handler))
        // Routes kept for older clients
        .route("/upload", post(upload_compress_handler))
        .route("/images", get(list_images_handler))
        // Users
        .route("/api/v1/users", get(list_users_handler).post(create_user_handler))
        .route("/api/v1/users/:id", get(get_user_handler))
        // System endpoints
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        // Stored files
        .nest_service("/static", ServeDir::new(&upload_dir))
        .nest_service("/api/uploads", ServeDir::new(&upload_dir))
        .nest_service("/compressed", ServeDir::new(&compressed_dir))
        .nest_service("/api/static", ServeDir::new(&compressed_dir))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(state.request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run a synchronous pipeline call on the blocking pool.
async fn run_blocking<T, F>(envelope: Envelope, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> pipeline::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| ApiError::from_pipeline(e, envelope)),
        Err(e) => {
            error!("Blocking task failed: {}", e);
            Err(ApiError::new(
                envelope,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

fn missing_image() -> ApiError {
    ApiError::legacy(StatusCode::BAD_REQUEST, "Please select a file to upload")
}

// ============================================================================
// Image handlers
// ============================================================================

async fn upload_handler(
    State(state): State<Arc<AppState>>,
    form: ImageForm,
) -> Result<Json<LegacyResponse<UploadData>>, ApiError> {
    let file = form.image.ok_or_else(missing_image)?;
    let pipeline = state.pipeline.clone();

    let receipt = run_blocking(Envelope::Legacy, move || {
        pipeline.upload(UploadRequest {
            filename: &file.file_name,
            content_type: file.content_type.as_deref(),
            bytes: &file.bytes,
        })
    })
    .await?;

    Ok(Json(LegacyResponse::ok(
        "File uploaded successfully",
        UploadData::from(&receipt),
    )))
}

async fn compress_handler(
    State(state): State<Arc<AppState>>,
    form: ImageForm,
) -> Result<Json<LegacyResponse<CompressData>>, ApiError> {
    let filename = form
        .field("filename")
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| {
            ApiError::legacy(
                StatusCode::BAD_REQUEST,
                "Please provide the name of the file to compress",
            )
        })?
        .to_string();
    let options = form.options();
    let pipeline = state.pipeline.clone();

    let report = run_blocking(Envelope::Legacy, move || {
        pipeline.compress_existing(&filename, &options)
    })
    .await?;

    info!(
        "Compressed {} -> {} ({})",
        report.source_name, report.result.output_name, report.result.ratio
    );

    Ok(Json(LegacyResponse::ok(
        "Image compressed successfully",
        CompressData::from(&report),
    )))
}

async fn upload_compress_handler(
    State(state): State<Arc<AppState>>,
    form: ImageForm,
) -> Result<Json<LegacyResponse<UploadCompressData>>, ApiError> {
    let options = form.options();
    let file = form.image.ok_or_else(missing_image)?;
    let pipeline = state.pipeline.clone();

    let report = run_blocking(Envelope::Legacy, move || {
        pipeline.upload_and_compress(
            UploadRequest {
                filename: &file.file_name,
                content_type: file.content_type.as_deref(),
                bytes: &file.bytes,
            },
            &options,
        )
    })
    .await?;

    Ok(Json(LegacyResponse::ok(
        "Image uploaded and compressed successfully",
        UploadCompressData::from(&report),
    )))
}

async fn formats_handler(State(state): State<Arc<AppState>>) -> Json<FormatsResponse> {
    Json(FormatsResponse {
        supported_formats: state.pipeline.supported_formats().to_vec(),
        max_file_size: format_limit_mb(state.pipeline.max_upload_bytes()),
    })
}

async fn list_images_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListImagesResponse>, ApiError> {
    let pipeline = state.pipeline.clone();
    let images = run_blocking(Envelope::Plain, move || pipeline.list_compressed()).await?;

    let images: Vec<ImageEntryDto> = images.into_iter().map(ImageEntryDto::from).collect();
    Ok(Json(ListImagesResponse {
        count: images.len(),
        images,
    }))
}

async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let pipeline = state.pipeline.clone();
    let (entry, path) =
        run_blocking(Envelope::Plain, move || pipeline.open_compressed(&filename)).await?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        ApiError::plain(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file")
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", entry.name),
        )
        .header(header::CONTENT_LENGTH, bytes.len())
        .header("Content-Description", "File Transfer")
        .header("Content-Transfer-Encoding", "binary")
        .body(Body::from(bytes))
        .map_err(|e| {
            error!("Failed to build download response: {}", e);
            ApiError::plain(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file")
        })
}

async fn delete_image_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse<DeletedData>>, ApiError> {
    let pipeline = state.pipeline.clone();
    let name = filename.clone();
    run_blocking(Envelope::Plain, move || pipeline.delete_compressed(&name)).await?;

    Ok(Json(MessageResponse {
        message: "File deleted successfully".to_string(),
        data: DeletedData { filename },
    }))
}

// ============================================================================
// User handlers
// ============================================================================

fn user_error(err: UserError) -> ApiError {
    match err {
        UserError::NotFound(_) => ApiError::plain(StatusCode::NOT_FOUND, "User not found"),
        UserError::InvalidInput(msg) => ApiError::plain(StatusCode::BAD_REQUEST, msg),
    }
}

async fn list_users_handler(State(state): State<Arc<AppState>>) -> Json<UsersResponse> {
    let users = state.users.list_all();
    Json(UsersResponse {
        count: users.len(),
        users,
    })
}

async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id: u64 = id
        .parse()
        .map_err(|_| ApiError::plain(StatusCode::BAD_REQUEST, "Invalid user ID"))?;
    let user = state.users.get_by_id(id).map_err(user_error)?;
    Ok(Json(UserResponse { user }))
}

async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| {
        ApiError::plain(
            StatusCode::BAD_REQUEST,
            format!("Invalid request data: {}", e.body_text()),
        )
    })?;
    let user = state
        .users
        .create(&request.name, request.age)
        .map_err(user_error)?;

    info!("Created user {} ({})", user.id, user.name);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
            data: user,
        }),
    ))
}

// ============================================================================
// System handlers
// ============================================================================

async fn home_handler() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Welcome to img-squeeze-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

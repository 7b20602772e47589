//! REST API request/response data transfer objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::{CompressionReport, UploadCompressReport, UploadReceipt};
use crate::storage::StoredImage;
use crate::users::User;

/// `{success, message, data}` envelope used by the image endpoints.
#[derive(Debug, Serialize)]
pub struct LegacyResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> LegacyResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LegacyErrorResponse {
    pub success: bool,
    pub message: String,
}

/// `{message, data}` envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Upload-only result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub file_type: String,
    pub original_name: String,
    pub upload_time: i64,
}

impl From<&UploadReceipt> for UploadData {
    fn from(receipt: &UploadReceipt) -> Self {
        Self {
            file_name: receipt.original_name.clone(),
            file_path: receipt.stored_name.clone(),
            file_size: receipt.size,
            file_type: receipt.content_type.clone(),
            original_name: receipt.original_name.clone(),
            upload_time: receipt.uploaded_at,
        }
    }
}

/// Compress-existing result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressData {
    pub original_file: String,
    pub compressed_file: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: String,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub keep_aspect: bool,
    pub format: String,
    pub mime_type: String,
    pub output_width: u32,
    pub output_height: u32,
    pub original_url: String,
    pub compressed_url: String,
}

impl From<&CompressionReport> for CompressData {
    fn from(report: &CompressionReport) -> Self {
        Self {
            original_file: report.source_name.clone(),
            compressed_file: report.result.output_name.clone(),
            original_size: report.result.original_size,
            compressed_size: report.result.compressed_size,
            compression_ratio: report.result.ratio.clone(),
            quality: report.options.quality,
            width: report.options.width,
            height: report.options.height,
            keep_aspect: report.options.keep_aspect,
            format: report.result.format.to_string(),
            mime_type: report.result.format.mime_type().to_string(),
            output_width: report.result.width,
            output_height: report.result.height,
            original_url: report.original_url.clone(),
            compressed_url: report.compressed_url.clone(),
        }
    }
}

/// Upload-and-compress result, shaped for the existing frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCompressData {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub file_type: String,
    pub original_file: String,
    pub original_size: u64,
    pub compression_ratio: String,
    pub original_url: String,
    pub compressed_url: String,
}

impl From<&UploadCompressReport> for UploadCompressData {
    fn from(report: &UploadCompressReport) -> Self {
        let result = &report.compression.result;
        Self {
            file_name: report.upload.original_name.clone(),
            file_path: result.output_name.clone(),
            file_size: result.compressed_size,
            file_type: report.upload.content_type.clone(),
            original_file: report.upload.stored_name.clone(),
            original_size: result.original_size,
            compression_ratio: result.ratio.clone(),
            original_url: report.compression.original_url.clone(),
            compressed_url: report.compression.compressed_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatsResponse {
    pub supported_formats: Vec<String>,
    pub max_file_size: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntryDto {
    pub filename: String,
    pub size: u64,
    pub mod_time: DateTime<Utc>,
    pub download_url: String,
}

impl From<StoredImage> for ImageEntryDto {
    fn from(image: StoredImage) -> Self {
        Self {
            filename: image.name,
            size: image.size,
            mod_time: image.modified,
            download_url: image.download_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListImagesResponse {
    pub images: Vec<ImageEntryDto>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedData {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub age: u32,
}

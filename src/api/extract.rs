//! Request body extraction for the image endpoints.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::{header, StatusCode};
use tracing::debug;

use super::error::ApiError;
use crate::processing::CompressionOptions;

/// Multipart field carrying the image file.
pub const IMAGE_FIELD: &str = "image";

const MALFORMED_REQUEST: &str = "File too large or malformed request";

#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Text fields plus the optional `image` part of a form submission.
///
/// Accepts `multipart/form-data` and `application/x-www-form-urlencoded`;
/// any other body yields an empty form so handlers report the missing field.
#[derive(Debug, Clone, Default)]
pub struct ImageForm {
    pub fields: HashMap<String, String>,
    pub image: Option<FilePart>,
}

impl ImageForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Compression options from the `quality`, `width`, `height` and
    /// `keepAspect` fields.
    pub fn options(&self) -> CompressionOptions {
        CompressionOptions::from_form(
            self.field("quality"),
            self.field("width"),
            self.field("height"),
            self.field("keepAspect"),
        )
    }
}

fn malformed(reason: impl std::fmt::Display) -> ApiError {
    debug!("Rejected request body: {}", reason);
    ApiError::legacy(StatusCode::BAD_REQUEST, MALFORMED_REQUEST)
}

#[axum::async_trait]
impl<S> FromRequest<S> for ImageForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(malformed)?;

            let mut form = ImageForm::default();
            while let Some(field) = multipart.next_field().await.map_err(malformed)? {
                let name = field.name().unwrap_or_default().to_string();
                if name == IMAGE_FIELD {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    form.image = Some(FilePart {
                        file_name,
                        content_type,
                        bytes,
                    });
                } else {
                    let value = field.text().await.map_err(malformed)?;
                    form.fields.insert(name, value);
                }
            }
            Ok(form)
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(malformed)?;
            Ok(ImageForm {
                fields,
                image: None,
            })
        } else {
            Ok(ImageForm::default())
        }
    }
}

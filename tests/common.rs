#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_squeeze_server::{
    AppState, ArtifactStore, FixedClock, InMemoryUserStore, LocalImageService, Pipeline,
};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const FIXED_TIMESTAMP: i64 = 1_700_000_000;

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    }))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

/// Pipeline over `<dir>/uploads` and `<dir>/compressed` with a pinned clock.
pub fn create_pipeline(dir: &TempDir, max_upload_bytes: u64) -> Pipeline {
    let store = ArtifactStore::new(dir.path().join("uploads"), dir.path().join("compressed"));
    store.ensure_dirs().unwrap();
    Pipeline::new(
        Arc::new(LocalImageService::default()),
        store,
        max_upload_bytes,
    )
    .with_clock(Arc::new(FixedClock(FIXED_TIMESTAMP)))
}

pub fn create_app_state(dir: &TempDir, max_upload_bytes: u64) -> Arc<AppState> {
    Arc::new(AppState::new(
        create_pipeline(dir, max_upload_bytes),
        Arc::new(InMemoryUserStore::seeded()),
        Duration::from_secs(30),
    ))
}

pub const BOUNDARY: &str = "----img-squeeze-test-boundary";

/// Hand-built multipart body: text fields first, then an optional `image` part.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, content_type, bytes)) = image {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

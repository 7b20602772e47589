mod common;

use common::*;
use image::{GenericImageView, ImageFormat};
use img_squeeze_server::pipeline::ErrorKind;
use img_squeeze_server::{CompressionOptions, PipelineError, SourceFormat, UploadRequest};
use std::fs;

fn request<'a>(filename: &'a str, bytes: &'a [u8]) -> UploadRequest<'a> {
    UploadRequest {
        filename,
        content_type: None,
        bytes,
    }
}

#[test]
fn test_upload_then_compress_png() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 10 * 1024 * 1024);
    let bytes = png_bytes(120, 80);

    let receipt = pipeline.upload(request("photo.png", &bytes)).unwrap();
    assert_eq!(receipt.content_type, "application/octet-stream");

    let report = pipeline
        .compress_existing(&receipt.stored_name, &CompressionOptions::default())
        .unwrap();

    assert_eq!(report.result.format, SourceFormat::Png);
    assert!(report.result.ratio.ends_with('%'));
    assert_eq!((report.result.width, report.result.height), (120, 80));

    let output = fs::read(pipeline.store().compressed_path(&report.result.output_name)).unwrap();
    assert_eq!(output.len() as u64, report.result.compressed_size);
    assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Png);

    // Upload is untouched
    assert_eq!(
        fs::read(pipeline.store().upload_path(&receipt.stored_name)).unwrap(),
        bytes
    );
}

#[test]
fn test_compress_missing_file_is_not_found() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 1024);

    let err = pipeline
        .compress_existing("missing.jpg", &CompressionOptions::default())
        .unwrap_err();

    assert!(matches!(err, PipelineError::NotFound(_)));
    assert!(pipeline.list_compressed().unwrap().is_empty());
}

#[test]
fn test_compress_unsupported_extension_is_rejected() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 1024);

    let err = pipeline
        .compress_existing("document.pdf", &CompressionOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains(".jpg, .jpeg, .png"));
}

#[test]
fn test_exact_resize_ignores_aspect() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 10 * 1024 * 1024);
    let receipt = pipeline.upload(request("square.jpg", &jpeg_bytes(400, 400))).unwrap();

    let options = CompressionOptions::new(80, 200, 100, false);
    let report = pipeline.compress_existing(&receipt.stored_name, &options).unwrap();

    assert_eq!((report.result.width, report.result.height), (200, 100));
    let written =
        image::open(pipeline.store().compressed_path(&report.result.output_name)).unwrap();
    assert_eq!(written.dimensions(), (200, 100));
}

#[test]
fn test_fit_resize_never_enlarges() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 10 * 1024 * 1024);
    let receipt = pipeline.upload(request("small.png", &png_bytes(50, 40))).unwrap();

    let options = CompressionOptions::new(85, 500, 500, true);
    let report = pipeline.compress_existing(&receipt.stored_name, &options).unwrap();

    assert_eq!((report.result.width, report.result.height), (50, 40));
}

#[test]
fn test_upload_is_not_listed_until_compressed() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 10 * 1024 * 1024);

    let receipt = pipeline.upload(request("photo.jpg", &jpeg_bytes(64, 64))).unwrap();
    assert!(pipeline.list_compressed().unwrap().is_empty());

    let report = pipeline
        .compress_existing(&receipt.stored_name, &CompressionOptions::default())
        .unwrap();

    let listed = pipeline.list_compressed().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, report.result.output_name);
    assert_eq!(listed[0].size, report.result.compressed_size);
    assert_eq!(
        listed[0].download_url,
        format!("/api/v1/images/download/{}", report.result.output_name)
    );
}

#[test]
fn test_upload_size_boundary() {
    let dir = create_temp_directory();
    let limit = 2048;
    let pipeline = create_pipeline(&dir, limit);

    let at_limit = vec![0u8; limit as usize];
    assert!(pipeline.upload(request("edge.jpg", &at_limit)).is_ok());

    let over = vec![0u8; limit as usize + 1];
    let err = pipeline.upload(request("over.jpg", &over)).unwrap_err();
    assert!(matches!(err, PipelineError::FileTooLarge { .. }));
}

#[test]
fn test_repeated_compression_in_same_second_conflicts() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 10 * 1024 * 1024);
    let receipt = pipeline.upload(request("photo.png", &png_bytes(16, 16))).unwrap();
    let options = CompressionOptions::default();

    let first = pipeline.compress_existing(&receipt.stored_name, &options).unwrap();
    let before = fs::read(pipeline.store().compressed_path(&first.result.output_name)).unwrap();

    let err = pipeline
        .compress_existing(&receipt.stored_name, &options)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let after = fs::read(pipeline.store().compressed_path(&first.result.output_name)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_disguised_format_is_rejected_without_output() {
    let dir = create_temp_directory();
    let pipeline = create_pipeline(&dir, 10 * 1024 * 1024);
    let bmp = encode(&gradient(8, 8), ImageFormat::Bmp);
    let receipt = pipeline.upload(request("bitmap.jpg", &bmp)).unwrap();

    let err = pipeline
        .compress_existing(&receipt.stored_name, &CompressionOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(pipeline.list_compressed().unwrap().is_empty());
}

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_squeeze_server::processing::{
    encode_image, load_image_with_metadata, plan_resize, process_image_pipeline, resize_image,
    CompressionOptions, EncoderSettings,
};
use img_squeeze_server::SourceFormat;
use std::path::PathBuf;
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    }))
}

fn create_test_image(
    width: u32,
    height: u32,
    format: ImageFormat,
    name: &str,
) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join(name);
    gradient(width, height)
        .save_with_format(&test_file, format)
        .unwrap();
    (test_file, temp_dir)
}

fn bench_option_parsing(c: &mut Criterion) {
    c.bench_function("compression_options_from_form", |b| {
        b.iter(|| {
            CompressionOptions::from_form(
                black_box(Some("75")),
                black_box(Some("800")),
                black_box(Some("600")),
                black_box(Some("false")),
            )
        })
    });
}

fn bench_resize_planning(c: &mut Criterion) {
    let options = CompressionOptions::new(85, 800, 600, true);
    c.bench_function("plan_resize_fit", |b| {
        b.iter(|| plan_resize(black_box((1920, 1080)), black_box(&options)))
    });
}

fn bench_image_loading(c: &mut Criterion) {
    let (test_file, _temp_dir) = create_test_image(1920, 1080, ImageFormat::Jpeg, "test.jpg");

    c.bench_function("image_loading", |b| {
        b.iter(|| load_image_with_metadata(black_box(&test_file), 16384))
    });
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_image");
    let source = gradient(1920, 1080);

    for &width in &[1280u32, 640, 320] {
        let options = CompressionOptions::new(85, width, 0, true);
        group.bench_with_input(BenchmarkId::from_parameter(width), &options, |b, options| {
            b.iter(|| {
                let mut img = source.clone();
                resize_image(&mut img, options, 16384).unwrap();
                img
            })
        });
    }
    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_image");
    group.sample_size(10);
    let img = gradient(640, 480);
    let settings = EncoderSettings::default();

    for &quality in &[50u8, 85, 95] {
        let options = CompressionOptions::new(quality as i64, 0, 0, true);
        group.bench_with_input(
            BenchmarkId::new("jpeg", quality),
            &options,
            |b, options| b.iter(|| encode_image(&img, SourceFormat::Jpeg, options, &settings)),
        );
    }

    let options = CompressionOptions::default();
    group.bench_function("png", |b| {
        b.iter(|| encode_image(&img, SourceFormat::Png, &options, &settings))
    });
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_image_pipeline");
    group.sample_size(10);
    let (input, temp_dir) = create_test_image(1280, 720, ImageFormat::Jpeg, "input.jpg");
    let settings = EncoderSettings::default();
    let options = CompressionOptions::new(80, 640, 0, true);
    let mut counter = 0u64;

    group.bench_function("jpeg_resize_640", |b| {
        b.iter(|| {
            // Outputs are created exclusively, so every iteration needs a fresh name.
            counter += 1;
            let output = temp_dir.path().join(format!("out_{}.jpg", counter));
            process_image_pipeline(&input, &output, &options, &settings)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_option_parsing,
    bench_resize_planning,
    bench_image_loading,
    bench_resize,
    bench_encoding,
    bench_full_pipeline
);
criterion_main!(benches);

use image::{DynamicImage, GenericImageView};
use img_squeeze_server::formats::FormatValidator;
use img_squeeze_server::naming::{compressed_name, upload_name};
use img_squeeze_server::processing::{plan_resize, resize_image, CompressionOptions};
use img_squeeze_server::validation::is_safe_artifact_name;
use proptest::prelude::*;

proptest! {
    #[test]
    fn quality_in_range_is_kept(quality in 1i64..=100i64) {
        let options = CompressionOptions::new(quality, 0, 0, true);
        prop_assert_eq!(options.quality as i64, quality);
    }

    #[test]
    fn quality_out_of_range_falls_back(quality in prop_oneof![-1000i64..=0, 101i64..1000]) {
        let options = CompressionOptions::new(quality, 0, 0, true);
        prop_assert_eq!(options.quality, 85);
    }

    #[test]
    fn fit_never_exceeds_box_or_source(
        src_w in 1u32..=2000,
        src_h in 1u32..=2000,
        box_w in 1u32..=2000,
        box_h in 1u32..=2000,
    ) {
        let options = CompressionOptions::new(85, box_w, box_h, true);
        let (w, h) = plan_resize((src_w, src_h), &options).unwrap_or((src_w, src_h));
        prop_assert!(w >= 1 && h >= 1);
        prop_assert!(w <= src_w && h <= src_h);
        prop_assert!(w <= box_w && h <= box_h);
    }

    #[test]
    fn exact_resize_hits_target(
        src_w in 1u32..=2000,
        src_h in 1u32..=2000,
        w in 1u32..=2000,
        h in 1u32..=2000,
    ) {
        let options = CompressionOptions::new(85, w, h, false);
        let planned = plan_resize((src_w, src_h), &options).unwrap_or((src_w, src_h));
        prop_assert_eq!(planned, (w, h));
    }

    #[test]
    fn width_only_keeps_proportion(
        width in 10u32..=400,
        height in 10u32..=400,
        new_width in 10u32..=400,
    ) {
        let mut img = DynamicImage::new_rgb8(width, height);
        let options = CompressionOptions::new(80, new_width, 0, true);

        resize_image(&mut img, &options, 16384).unwrap();

        let (w, h) = img.dimensions();
        prop_assert_eq!(w, new_width);
        let expected = (height as f64 * new_width as f64 / width as f64).round().max(1.0) as u32;
        prop_assert_eq!(h, expected);
    }

    #[test]
    fn supported_extensions_match_any_case(
        stem in "[a-zA-Z0-9_-]{1,20}",
        ext in prop::sample::select(vec!["jpg", "JPG", "jpeg", "JpEg", "png", "PNG"]),
    ) {
        let validator = FormatValidator::default();
        let filename = format!("{}.{}", stem, ext);
        prop_assert!(validator.is_supported(&filename));
    }

    #[test]
    fn other_extensions_are_rejected(
        stem in "[a-zA-Z0-9_-]{1,20}",
        ext in prop::sample::select(vec!["gif", "webp", "pdf", "txt", "bmp", "tiff"]),
    ) {
        let validator = FormatValidator::default();
        let filename = format!("{}.{}", stem, ext);
        prop_assert!(!validator.is_supported(&filename));
    }

    #[test]
    fn generated_names_stay_safe(
        stem in "[a-zA-Z0-9_-]{1,20}",
        ts in 0i64..=4_000_000_000,
    ) {
        let original = format!("{}.png", stem);
        let uploaded = upload_name(&original, ts);
        let compressed = compressed_name(&uploaded, ts);

        prop_assert!(is_safe_artifact_name(&uploaded));
        prop_assert!(is_safe_artifact_name(&compressed));
        prop_assert!(compressed.ends_with(".png"));
        let marker = format!("_compressed_{}", ts);
        prop_assert!(compressed.contains(&marker));
    }
}

//! Utility functions for size and ratio reporting
//!
//! Helpers shared by the compression engine, the pipeline and the HTTP layer.

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Upload ceiling as advertised by the formats endpoint ("10 MB").
///
/// Limits that are not whole mebibytes fall back to [`format_file_size`].
pub fn format_limit_mb(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes > 0 && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format_file_size(bytes)
    }
}

/// Compressed size as a percentage of the original size.
///
/// Values above 100 mean the output grew. An empty original yields 0.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    compressed_size as f64 / original_size as f64 * 100.0
}

/// Ratio rendered with one decimal place, e.g. `"73.2%"`.
pub fn format_ratio(original_size: u64, compressed_size: u64) -> String {
    format!(
        "{:.1}%",
        calculate_compression_ratio(original_size, compressed_size)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_format_limit_mb() {
        assert_eq!(format_limit_mb(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_limit_mb(1024 * 1024), "1 MB");
        assert_eq!(format_limit_mb(1000), "1000 B");
        assert_eq!(format_limit_mb(1536 * 1024), "1.5 MB");
        assert_eq!(format_limit_mb(10 * 1024 * 1024 + 1), "10.0 MB");
    }

    #[test]
    fn test_calculate_compression_ratio() {
        assert_eq!(calculate_compression_ratio(1000, 800), 80.0);
        assert_eq!(calculate_compression_ratio(1000, 1200), 120.0);
        assert_eq!(calculate_compression_ratio(1000, 1000), 100.0);
        assert_eq!(calculate_compression_ratio(0, 500), 0.0);
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(500_000, 366_000), "73.2%");
        assert_eq!(format_ratio(1000, 1500), "150.0%");
        assert_eq!(format_ratio(3, 1), "33.3%");
    }
}

use std::collections::HashSet;
use std::sync::OnceLock;

// Image extensions recognized in a combined store, in probe order.
pub const IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png"];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

// Struct to hold per-ingest processing statistics
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub total: usize,
    pub integrated: usize,
    pub skipped_missing_image: usize,
    pub skipped_decode: usize,
    pub skipped_empty: usize,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_summary(&self, dataset_name: &str) {
        log::info!("=== {} ingest summary ===", dataset_name);
        log::info!("Source items examined: {}", self.total);
        log::info!("Integrated into combined store: {}", self.integrated);
        log::info!("Skipped (missing image file): {}", self.skipped_missing_image);
        log::info!("Skipped (undecodable image or mask): {}", self.skipped_decode);
        log::info!("Skipped (no retained annotations): {}", self.skipped_empty);

        let total_skipped = self.skipped_missing_image + self.skipped_decode + self.skipped_empty;
        if total_skipped > 0 {
            log::warn!(
                "Total skipped items: {} (missing image: {}, undecodable: {}, empty: {})",
                total_skipped,
                self.skipped_missing_image,
                self.skipped_decode,
                self.skipped_empty
            );
        }
    }
}

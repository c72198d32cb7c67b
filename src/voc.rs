use log::{info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::adapter::{DatasetAdapter, ExtractedImage, Extraction};
use crate::conversion::normalize_box;
use crate::error::Result;

// Subset directories a Pascal-VOC CSV export is organized into
const SUBSETS: &[&str] = &["train", "test", "valid"];

const ANNOTATIONS_FILE: &str = "_annotations.csv";

/// One row of a `_annotations.csv` file: Pascal-VOC corner coordinates plus
/// the image dimensions the exporter recorded.
#[derive(Debug, Clone, Deserialize)]
struct VocRow {
    filename: String,
    width: u32,
    height: u32,
    #[serde(rename = "class")]
    class_name: String,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

/// Adapter for datasets annotated with per-subset Pascal-VOC CSV files.
///
/// Rows whose class name does not exactly match `target_class` are dropped;
/// survivors are remapped to the single output `class_id`. The declared
/// `width`/`height` columns are trusted for normalization; the image bytes
/// are never decoded.
#[derive(Debug, Clone)]
pub struct VocCsvAdapter {
    pub target_class: String,
    pub class_id: u32,
}

impl DatasetAdapter for VocCsvAdapter {
    fn extract(&self, root: &Path) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        for subset in SUBSETS {
            let subset_path = root.join(subset);
            let annotations_file = subset_path.join(ANNOTATIONS_FILE);

            if !annotations_file.exists() {
                info!("Annotations file not found for '{}'. Skipping.", subset);
                continue;
            }

            let mut reader = csv::Reader::from_path(&annotations_file)?;
            let mut grouped: BTreeMap<String, Vec<VocRow>> = BTreeMap::new();
            for record in reader.deserialize() {
                let row: VocRow = record?;
                if row.class_name == self.target_class {
                    grouped.entry(row.filename.clone()).or_default().push(row);
                }
            }

            if grouped.is_empty() {
                info!("No '{}' annotations found in '{}'.", self.target_class, subset);
                continue;
            }

            for (filename, rows) in grouped {
                extraction.stats.total += 1;

                let image_path = subset_path.join(&filename);
                if !image_path.exists() {
                    warn!("Image file {} not found. Skipping.", filename);
                    extraction.stats.skipped_missing_image += 1;
                    continue;
                }

                let mut label_lines = Vec::new();
                for row in &rows {
                    let norm = match normalize_box(
                        row.width, row.height, row.xmin, row.ymin, row.xmax, row.ymax,
                    ) {
                        Ok(norm) => norm,
                        Err(e) => {
                            warn!("Skipping record for {}: {}", filename, e);
                            continue;
                        }
                    };
                    label_lines.push(norm.to_label_line(self.class_id));
                }

                if label_lines.is_empty() {
                    extraction.stats.skipped_empty += 1;
                    continue;
                }

                extraction.images.push(ExtractedImage {
                    image_path,
                    label_lines,
                });
            }
        }

        Ok(extraction)
    }
}

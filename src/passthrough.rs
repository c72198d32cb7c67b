use log::warn;
use std::fs;
use std::path::Path;

use crate::adapter::{DatasetAdapter, ExtractedImage, Extraction};
use crate::error::{Error, Result};
use crate::types::IMG_FORMATS;

/// Adapter for datasets that already carry normalized YOLO label files.
///
/// Keeps only lines whose leading class-id token equals `target_class_id`
/// and emits them verbatim, without re-normalizing. Label files left with no
/// surviving lines are dropped along with their images.
#[derive(Debug, Clone)]
pub struct YoloAdapter {
    pub target_class_id: u32,
}

impl DatasetAdapter for YoloAdapter {
    fn extract(&self, root: &Path) -> Result<Extraction> {
        let source_images_dir = root.join("images");
        let source_labels_dir = root.join("labels");

        if !source_labels_dir.is_dir() {
            return Err(Error::MissingInput(source_labels_dir));
        }

        let mut label_paths: Vec<_> = fs::read_dir(&source_labels_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        label_paths.sort();

        let class_prefix = format!("{} ", self.target_class_id);
        let mut extraction = Extraction::default();

        for label_path in label_paths {
            extraction.stats.total += 1;

            let content = fs::read_to_string(&label_path)?;
            let label_lines: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|line| line.starts_with(&class_prefix))
                .map(str::to_string)
                .collect();

            // Only proceed if the file contains labels for the target class id
            if label_lines.is_empty() {
                extraction.stats.skipped_empty += 1;
                continue;
            }

            let Some(base_name) = label_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(image_path) = IMG_FORMATS
                .iter()
                .map(|ext| source_images_dir.join(format!("{}.{}", base_name, ext)))
                .find(|candidate| candidate.exists())
            else {
                warn!("Corresponding image for {} not found. Skipping.", base_name);
                extraction.stats.skipped_missing_image += 1;
                continue;
            };

            extraction.images.push(ExtractedImage {
                image_path,
                label_lines,
            });
        }

        Ok(extraction)
    }
}

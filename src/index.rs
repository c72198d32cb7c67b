use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::conversion::{denormalize_box, parse_label_line, NormalizedBox};
use crate::error::{Error, Result};
use crate::store::CombinedStore;
use crate::utils::ensure_directory;

/// One row of the tabular index: a single annotation with absolute integer
/// coordinates. The index is a rebuildable snapshot of the combined store,
/// never the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRow {
    pub image_filename: String,
    pub image_width: u32,
    pub image_height: u32,
    pub class_id: u32,
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
    pub bbox_width: i64,
    pub bbox_height: i64,
}

impl BoxRow {
    /// Bounding-box area as a percentage of image area.
    pub fn relative_area_percent(&self) -> f64 {
        let image_area = self.image_width as f64 * self.image_height as f64;
        let bbox_area = self.bbox_width as f64 * self.bbox_height as f64;
        bbox_area / image_area * 100.0
    }

    /// Regenerate the normalized label line for this row from its integer
    /// coordinates. Used by the synchronizer to decide which stored lines
    /// are still valid, so it must format identically to the adapters.
    pub fn to_label_line(&self) -> String {
        let norm = NormalizedBox {
            x_center: (self.x_min as f64 + self.bbox_width as f64 / 2.0)
                / self.image_width as f64,
            y_center: (self.y_min as f64 + self.bbox_height as f64 / 2.0)
                / self.image_height as f64,
            width: self.bbox_width as f64 / self.image_width as f64,
            height: self.bbox_height as f64 / self.image_height as f64,
        };
        norm.to_label_line(self.class_id)
    }
}

/// Rebuild the tabular index from the combined store.
///
/// Reads every label file and its paired image's pixel dimensions, emitting
/// one row per label line. A label file whose image cannot be found is
/// logged and skipped, as is an image that cannot be decoded.
pub fn rebuild(store: &CombinedStore) -> Result<Vec<BoxRow>> {
    let mut rows = Vec::new();

    for label_path in store.label_files()? {
        let Some(base_name) = label_path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let Some(image_path) = store.find_image(base_name) else {
            warn!("{}. Skipping.", Error::MissingPair(base_name.to_string()));
            continue;
        };
        // find_image only returns paths it just built from valid UTF-8
        let image_filename = image_path.file_name().unwrap().to_str().unwrap().to_string();

        let (image_width, image_height) = match imagesize::size(&image_path) {
            Ok(size) => (size.width as u32, size.height as u32),
            Err(e) => {
                warn!("Could not read image {}: {}. Skipping.", image_path.display(), e);
                continue;
            }
        };
        if image_width == 0 || image_height == 0 {
            warn!("Degenerate dimensions for {}. Skipping.", image_filename);
            continue;
        }

        for line in store.read_label_lines(base_name)? {
            let Some((class_id, norm)) = parse_label_line(&line) else {
                continue;
            };

            let (x_min, y_min, x_max, y_max) =
                denormalize_box(image_width, image_height, &norm);
            rows.push(BoxRow {
                image_filename: image_filename.clone(),
                image_width,
                image_height,
                class_id,
                x_min: x_min.round() as i64,
                y_min: y_min.round() as i64,
                x_max: x_max.round() as i64,
                y_max: y_max.round() as i64,
                bbox_width: (norm.width * image_width as f64).round() as i64,
                bbox_height: (norm.height * image_height as f64).round() as i64,
            });
        }
    }

    Ok(rows)
}

/// Apply the retention predicate: minimum relative area, and, when given, a
/// filename prefix scoping the pass to one dataset's contribution. Pure
/// filter; no side effects on disk.
pub fn retain(rows: &[BoxRow], min_area_percent: f64, prefix: Option<&str>) -> Vec<BoxRow> {
    rows.iter()
        .filter(|row| row.relative_area_percent() >= min_area_percent)
        .filter(|row| prefix.is_none_or(|p| row.image_filename.starts_with(p)))
        .cloned()
        .collect()
}

/// Write the index to a CSV file, creating parent directories as needed.
pub fn write_csv(path: &Path, rows: &[BoxRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an index CSV written by [`write_csv`].
pub fn read_csv(path: &Path) -> Result<Vec<BoxRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

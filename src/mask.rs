use glob::glob;
use image::GrayImage;
use log::warn;
use std::path::Path;

use crate::adapter::{DatasetAdapter, ExtractedImage, Extraction};
use crate::conversion::normalize_box;
use crate::error::Result;

/// Adapter for datasets labeled with single-channel segmentation masks.
///
/// Every `labels/*.png` raster under the source tree denotes instances as
/// non-zero pixel regions; the paired image lives in the sibling `images/`
/// directory under the same filename. Each 8-connected component of the mask
/// becomes one bounding-box annotation.
#[derive(Debug, Clone)]
pub struct MaskAdapter {
    pub class_id: u32,
}

impl Default for MaskAdapter {
    fn default() -> Self {
        Self { class_id: 0 }
    }
}

impl DatasetAdapter for MaskAdapter {
    fn extract(&self, root: &Path) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        let pattern = format!("{}/**/labels/*.png", root.display());
        let mask_paths: Vec<_> = glob(&pattern)
            .expect("Failed to read mask glob pattern")
            .filter_map(|entry| entry.ok())
            .collect();

        for mask_path in mask_paths {
            extraction.stats.total += 1;

            let Some(file_name) = mask_path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(image_path) = mask_path
                .parent()
                .and_then(Path::parent)
                .map(|subset| subset.join("images").join(file_name))
            else {
                continue;
            };

            if !image_path.exists() {
                warn!(
                    "Corresponding image for {} not found. Skipping.",
                    file_name
                );
                extraction.stats.skipped_missing_image += 1;
                continue;
            }

            // The paired image's dimensions drive normalization, not the mask's.
            let (img_width, img_height) = match imagesize::size(&image_path) {
                Ok(size) => (size.width as u32, size.height as u32),
                Err(e) => {
                    warn!("Could not read image {}: {}. Skipping.", image_path.display(), e);
                    extraction.stats.skipped_decode += 1;
                    continue;
                }
            };

            let mask = match image::open(&mask_path) {
                Ok(img) => img.into_luma8(),
                Err(e) => {
                    warn!("Could not read mask {}: {}. Skipping.", mask_path.display(), e);
                    extraction.stats.skipped_decode += 1;
                    continue;
                }
            };

            let mut label_lines = Vec::new();
            for rect in component_bounding_rects(&mask) {
                let norm = match normalize_box(
                    img_width,
                    img_height,
                    rect.x as f64,
                    rect.y as f64,
                    (rect.x + rect.width) as f64,
                    (rect.y + rect.height) as f64,
                ) {
                    Ok(norm) => norm,
                    Err(e) => {
                        warn!("Skipping record in {}: {}", file_name, e);
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

        Ok(extraction)
    }
}

/// Axis-aligned bounding rectangle of one connected component, with
/// exclusive extent (`width = max_x - min_x + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Find the bounding rectangle of every 8-connected component of non-zero
/// pixels, in scan order of each component's first pixel.
///
/// Internal holes do not affect a component's bounding rectangle, so this is
/// equivalent to taking the bounding rectangle of each external contour.
pub fn component_bounding_rects(mask: &GrayImage) -> Vec<ComponentRect> {
    let (width, height) = mask.dimensions();
    let w = width as usize;
    let h = height as usize;
    let pixels = mask.as_raw();

    let mut visited = vec![false; w * h];
    let mut rects = Vec::new();

    // Direction vectors for 8-connectivity: E, SE, S, SW, W, NW, N, NE
    let dx: [i64; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
    let dy: [i64; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

    let mut stack = Vec::new();
    for start_y in 0..h {
        for start_x in 0..w {
            let start_idx = start_y * w + start_x;
            if pixels[start_idx] == 0 || visited[start_idx] {
                continue;
            }

            let (mut min_x, mut max_x) = (start_x, start_x);
            let (mut min_y, mut max_y) = (start_y, start_y);

            visited[start_idx] = true;
            stack.push((start_x, start_y));
            while let Some((x, y)) = stack.pop() {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                for dir in 0..8 {
                    let nx = x as i64 + dx[dir];
                    let ny = y as i64 + dy[dir];
                    if nx < 0 || nx >= w as i64 || ny < 0 || ny >= h as i64 {
                        continue;
                    }
                    let nidx = (ny as usize) * w + (nx as usize);
                    if pixels[nidx] != 0 && !visited[nidx] {
                        visited[nidx] = true;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }

            rects.push(ComponentRect {
                x: min_x as u32,
                y: min_y as u32,
                width: (max_x - min_x + 1) as u32,
                height: (max_y - min_y + 1) as u32,
            });
        }
    }

    rects
}

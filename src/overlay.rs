use image::{Rgb, RgbImage};
use log::warn;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::index::{self, BoxRow};
use crate::utils::{create_progress_bar, ensure_directory};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: u32 = 3;

/// Draw every indexed bounding box onto its image and save the annotated
/// copies to `output_dir`. A visual audit aid; the store is not modified.
pub fn draw_boxes(index_csv: &Path, images_dir: &Path, output_dir: &Path) -> Result<()> {
    if !index_csv.exists() {
        return Err(Error::MissingInput(index_csv.to_path_buf()));
    }
    let rows = index::read_csv(index_csv)?;
    ensure_directory(output_dir)?;

    let mut grouped: BTreeMap<&str, Vec<&BoxRow>> = BTreeMap::new();
    for row in &rows {
        grouped.entry(&row.image_filename).or_default().push(row);
    }

    let pb = create_progress_bar(grouped.len() as u64, "Drawing");
    for (image_filename, rows) in grouped {
        let image_path = images_dir.join(image_filename);
        let mut img = match image::open(&image_path) {
            Ok(img) => img.into_rgb8(),
            Err(e) => {
                warn!("Could not open {}: {}. Skipping.", image_path.display(), e);
                pb.inc(1);
                continue;
            }
        };

        for row in rows {
            if let Some(bbox) = clamp_box(row, img.dimensions()) {
                draw_rect(&mut img, bbox, BOX_COLOR, BOX_THICKNESS);
            }
        }

        let output_path = output_dir.join(image_filename);
        if let Err(e) = img.save(&output_path) {
            warn!("Could not save {}: {}. Skipping.", output_path.display(), e);
        }
        pb.inc(1);
    }
    pb.finish_with_message("Overlay rendering complete");

    Ok(())
}

/// Clamp a row's corners into pixel bounds; rejects boxes that are entirely
/// degenerate after clamping.
fn clamp_box(row: &BoxRow, dims: (u32, u32)) -> Option<[u32; 4]> {
    let (w, h) = dims;
    if w == 0 || h == 0 {
        return None;
    }
    let clamp = |v: i64, max: u32| -> u32 { v.clamp(0, max as i64 - 1) as u32 };
    let x0 = clamp(row.x_min, w);
    let y0 = clamp(row.y_min, h);
    let x1 = clamp(row.x_max, w);
    let y1 = clamp(row.y_max, h);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some([x0, y0, x1, y1])
}

/// Draw a rectangle border with given thickness.
fn draw_rect(img: &mut RgbImage, bbox_px: [u32; 4], color: Rgb<u8>, thickness: u32) {
    let (w, h) = img.dimensions();
    let [x0, y0, x1, y1] = bbox_px;
    for t in 0..thickness {
        let xx0 = x0.saturating_add(t);
        let yy0 = y0.saturating_add(t);
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 >= w || yy0 >= h || xx1 >= w || yy1 >= h || xx0 > xx1 || yy0 > yy1 {
            continue;
        }
        for x in xx0..=xx1 {
            img.put_pixel(x, yy0, color);
            img.put_pixel(x, yy1, color);
        }
        for y in yy0..=yy1 {
            img.put_pixel(xx0, y, color);
            img.put_pixel(xx1, y, color);
        }
    }
}

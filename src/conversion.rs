use crate::error::{Error, Result};

/// A bounding box in the normalized center form used by YOLO label files:
/// center point and extent, each divided by the corresponding image dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    /// Render one label-file line: `<class_id> <xc> <yc> <w> <h>` with
    /// exactly 6 fractional digits per field.
    pub fn to_label_line(&self, class_id: u32) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// Convert absolute corner coordinates to normalized center form.
///
/// Outputs are clamped to `[0, 1]`, which tolerates annotations that slightly
/// overrun the image border.
pub fn normalize_box(
    image_width: u32,
    image_height: u32,
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
) -> Result<NormalizedBox> {
    if image_width == 0 || image_height == 0 {
        return Err(Error::InvalidGeometry {
            width: image_width,
            height: image_height,
        });
    }

    let dw = 1.0 / image_width as f64;
    let dh = 1.0 / image_height as f64;

    Ok(NormalizedBox {
        x_center: ((x_min + x_max) / 2.0 * dw).clamp(0.0, 1.0),
        y_center: ((y_min + y_max) / 2.0 * dh).clamp(0.0, 1.0),
        width: ((x_max - x_min) * dw).clamp(0.0, 1.0),
        height: ((y_max - y_min) * dh).clamp(0.0, 1.0),
    })
}

/// Inverse of [`normalize_box`]: recover absolute corner coordinates
/// `(x_min, y_min, x_max, y_max)` in pixels, as floating point.
///
/// Integer serialization (for the tabular index) rounds each value
/// half-away-from-zero, which is what `f64::round` does.
pub fn denormalize_box(
    image_width: u32,
    image_height: u32,
    norm: &NormalizedBox,
) -> (f64, f64, f64, f64) {
    let bbox_width = norm.width * image_width as f64;
    let bbox_height = norm.height * image_height as f64;
    let x_center = norm.x_center * image_width as f64;
    let y_center = norm.y_center * image_height as f64;

    (
        x_center - bbox_width / 2.0,
        y_center - bbox_height / 2.0,
        x_center + bbox_width / 2.0,
        y_center + bbox_height / 2.0,
    )
}

/// Parse one label-file line into `(class_id, NormalizedBox)`.
///
/// Lines that do not consist of exactly five numeric fields are rejected.
pub fn parse_label_line(line: &str) -> Option<(u32, NormalizedBox)> {
    let fields: Vec<f64> = line
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if fields.len() != 5 {
        return None;
    }

    Some((
        fields[0] as u32,
        NormalizedBox {
            x_center: fields[1],
            y_center: fields[2],
            width: fields[3],
            height: fields[4],
        },
    ))
}

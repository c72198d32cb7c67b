use clap::ValueEnum;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::IngestStats;

/// One source image together with the label lines retained for it.
///
/// Adapters produce entries only for images with at least one retained
/// annotation; an image with nothing to keep never reaches the consolidator.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// Path of the source image file (read-only; copied, never moved).
    pub image_path: PathBuf,
    /// Fully formatted label-file lines for this image.
    pub label_lines: Vec<String>,
}

/// The result of running an adapter over a source dataset.
#[derive(Debug, Default)]
pub struct Extraction {
    pub images: Vec<ExtractedImage>,
    pub stats: IngestStats,
}

/// A source-dataset format adapter.
///
/// Implementations translate a dataset's native annotation representation
/// into per-image label-line sets, without mutating the source tree.
pub trait DatasetAdapter {
    fn extract(&self, root: &Path) -> Result<Extraction>;
}

// Enumeration of the supported source dataset formats
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum DatasetKind {
    /// Single-channel segmentation masks, one instance per connected component
    Mask,
    /// Pascal-VOC boxes in per-subset `_annotations.csv` files
    VocCsv,
    /// Pre-existing YOLO label files, filtered by class id
    Yolo,
}

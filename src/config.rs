use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::adapter::DatasetKind;

/// Command-line arguments parser for the dataset consolidation pipeline.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract a source dataset and integrate it into the combined store
    Ingest {
        /// Format of the source dataset
        #[arg(value_enum)]
        kind: DatasetKind,

        /// Root directory of the source dataset
        source: PathBuf,

        /// Root directory of the combined store
        combined: PathBuf,

        /// Dataset name, prepended to every output filename
        #[arg(long = "name")]
        dataset_name: String,

        /// Class id written to the output label files
        #[arg(long = "class_id", default_value_t = 0)]
        class_id: u32,

        /// Class name retained by the Pascal-VOC CSV adapter
        #[arg(long = "target_class", default_value = "Cavity")]
        target_class: String,

        /// Class id retained by the YOLO passthrough adapter
        #[arg(long = "target_class_id", default_value_t = 0)]
        target_class_id: u32,
    },

    /// Rebuild the bounding-box index CSV from the combined store
    ExportBoxes {
        /// Root directory of the combined store
        combined: PathBuf,

        /// Output CSV path (defaults to meta/bounding_boxes.csv in the store)
        #[arg(long = "output")]
        output: Option<PathBuf>,
    },

    /// Prune the combined store down to annotations passing the retention filter
    Clean {
        /// Root directory of the combined store
        combined: PathBuf,

        /// Minimum bounding-box area as a percentage of image area
        #[arg(long = "min_area", default_value_t = 0.1)]
        min_area: f64,

        /// Restrict the pass to filenames with this prefix (e.g. "dc1000_")
        #[arg(long = "prefix")]
        prefix: Option<String>,
    },

    /// Partition the combined store into train/val/test directory pairs
    Split {
        /// Root directory of the combined store
        combined: PathBuf,

        /// Output directory receiving the per-split subdirectories
        output: PathBuf,

        /// Proportion of the dataset to use for training
        #[arg(long = "train_ratio", default_value_t = 0.8, value_parser = validate_ratio)]
        train_ratio: f64,

        /// Proportion of the dataset to use for validation
        #[arg(long = "val_ratio", default_value_t = 0.1, value_parser = validate_ratio)]
        val_ratio: f64,

        /// Proportion of the dataset to use for testing
        #[arg(long = "test_ratio", default_value_t = 0.1, value_parser = validate_ratio)]
        test_ratio: f64,

        /// Seed for the deterministic shuffle
        #[arg(long = "seed", default_value_t = 42)]
        seed: u64,
    },

    /// Draw indexed bounding boxes onto their images for visual inspection
    Draw {
        /// Root directory of the combined store
        combined: PathBuf,

        /// Output directory (defaults to images_with_bboxes in the store)
        #[arg(long = "output")]
        output: Option<PathBuf>,
    },
}

// Validate that a ratio is between 0.0 and 1.0
fn validate_ratio(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("RATIO must be between 0.0 and 1.0".to_string()),
    }
}

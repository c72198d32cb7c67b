use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::store::CombinedStore;
use crate::utils::{create_progress_bar, ensure_directory};

/// Train/validation/test proportions. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    pub fn validate(&self) -> Result<()> {
        let sum = self.train + self.val + self.test;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::InvalidRatios(sum));
        }
        Ok(())
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.8,
            val: 0.1,
            test: 0.1,
        }
    }
}

/// A disjoint, exhaustive partition of base filenames into the three splits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAssignment {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Vec<String>,
}

/// Partition base filenames deterministically.
///
/// The list is sorted before shuffling so that filesystem iteration order
/// cannot influence the permutation; the same seed and input set always
/// produce the same assignment. Cut points are `floor(N * train)` and
/// `floor(N * (train + val))`.
pub fn assign_splits(mut base_names: Vec<String>, ratios: SplitRatios, seed: u64) -> SplitAssignment {
    base_names.sort();

    let mut rng = StdRng::seed_from_u64(seed);
    base_names.shuffle(&mut rng);

    let total = base_names.len();
    let train_end = (total as f64 * ratios.train) as usize;
    let val_end = (total as f64 * (ratios.train + ratios.val)) as usize;

    let test = base_names.split_off(val_end);
    let val = base_names.split_off(train_end);

    SplitAssignment {
        train: base_names,
        val,
        test,
    }
}

/// Materialize the splits as `<split>/images/` + `<split>/labels/`
/// directory pairs under `output_dir`, then log a size summary.
pub fn split_dataset(
    store: &CombinedStore,
    output_dir: &Path,
    ratios: SplitRatios,
    seed: u64,
) -> Result<()> {
    ratios.validate()?;

    let base_names = store.base_names()?;
    let total = base_names.len();
    if total == 0 {
        warn!("Combined store holds no images; nothing to split.");
        return Ok(());
    }

    let assignment = assign_splits(base_names, ratios, seed);
    let splits: [(&str, &[String]); 3] = [
        ("train", &assignment.train),
        ("val", &assignment.val),
        ("test", &assignment.test),
    ];

    for (split_name, files) in splits {
        let dest_images_dir = ensure_directory(&output_dir.join(split_name).join("images"))?;
        let dest_labels_dir = ensure_directory(&output_dir.join(split_name).join("labels"))?;

        let pb = create_progress_bar(files.len() as u64, split_name);
        files.par_iter().try_for_each(|base_name| -> Result<()> {
            let result = copy_pair(store, base_name, &dest_images_dir, &dest_labels_dir);
            pb.inc(1);
            result
        })?;
        pb.finish_with_message(format!("{} copy complete", split_name));
    }

    info!("Total files processed: {}", total);
    for (split_name, files) in splits {
        info!(
            "{:<5} set size: {} files ({:.2}%)",
            split_name,
            files.len(),
            files.len() as f64 / total as f64 * 100.0
        );
    }

    Ok(())
}

fn copy_pair(
    store: &CombinedStore,
    base_name: &str,
    dest_images_dir: &Path,
    dest_labels_dir: &Path,
) -> Result<()> {
    let Some(src_image) = store.find_image(base_name) else {
        warn!("Could not find image for base name {}. Skipping.", base_name);
        return Ok(());
    };
    // find_image guarantees a file name component
    let image_file_name = src_image.file_name().unwrap();
    fs::copy(&src_image, dest_images_dir.join(image_file_name))?;

    let src_label = store.label_path(base_name);
    if src_label.exists() {
        fs::copy(&src_label, dest_labels_dir.join(format!("{}.txt", base_name)))?;
    }

    Ok(())
}

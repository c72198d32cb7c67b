use dashmap::DashSet;
use log::warn;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

use crate::adapter::ExtractedImage;
use crate::error::{Error, Result};
use crate::store::CombinedStore;
use crate::utils::create_progress_bar;

/// Merge one adapter's output into the combined store.
///
/// Every output filename is prefixed with `<dataset_name>_` so that distinct
/// source datasets sharing the store cannot collide. Two entries of the same
/// batch mapping to one output name abort the run with
/// [`Error::NameCollision`]; re-running the same dataset overwrites its own
/// earlier files.
///
/// Returns the number of images integrated.
pub fn integrate(
    store: &CombinedStore,
    dataset_name: &str,
    images: &[ExtractedImage],
) -> Result<usize> {
    let claimed: DashSet<String> = DashSet::new();
    let integrated = AtomicUsize::new(0);
    let pb = create_progress_bar(images.len() as u64, dataset_name);

    images.par_iter().try_for_each(|item| {
        let result = integrate_one(store, dataset_name, item, &claimed);
        if result.is_ok() {
            integrated.fetch_add(1, Relaxed);
        }
        pb.inc(1);
        result
    })?;

    pb.finish_with_message(format!("{} integration complete", dataset_name));
    Ok(integrated.into_inner())
}

fn integrate_one(
    store: &CombinedStore,
    dataset_name: &str,
    item: &ExtractedImage,
    claimed: &DashSet<String>,
) -> Result<()> {
    let Some(file_name) = item.image_path.file_name().and_then(|n| n.to_str()) else {
        warn!("Unrepresentable image path: {:?}", item.image_path);
        return Ok(());
    };

    let new_image_name = sanitize_filename::sanitize(format!("{}_{}", dataset_name, file_name));
    if !claimed.insert(new_image_name.clone()) {
        return Err(Error::NameCollision(new_image_name));
    }

    let base_name = match std::path::Path::new(&new_image_name)
        .file_stem()
        .and_then(|s| s.to_str())
    {
        Some(stem) => stem.to_string(),
        None => return Ok(()),
    };

    store.put_image(&item.image_path, &new_image_name)?;
    store.write_label_lines(&base_name, &item.label_lines)?;
    Ok(())
}

use log::info;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::Result;
use crate::index::{self, BoxRow};
use crate::store::CombinedStore;

/// Counts reported by one synchronizer run. A second run over the same
/// store must report zero removals and zero rewrites.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub rows_total: usize,
    pub rows_retained: usize,
    pub images_removed: usize,
    pub labels_removed: usize,
    pub files_rewritten: usize,
    pub lines_removed: usize,
}

/// Reconcile the combined store with its retention predicate.
///
/// Stages, in order: rebuild the tabular index (persisted to
/// `meta/bounding_boxes.csv`), filter it by minimum relative area and
/// optional filename prefix, delete prefix-scoped images absent from the
/// retained set, then rewrite surviving label files down to exactly the
/// lines the retained rows regenerate. After this returns, the store and a
/// freshly rebuilt index agree, and every remaining annotation satisfies
/// the predicate.
pub fn synchronize(
    store: &CombinedStore,
    min_area_percent: f64,
    prefix: Option<&str>,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    let rows = index::rebuild(store)?;
    index::write_csv(&store.index_path(), &rows)?;
    report.rows_total = rows.len();

    let retained = index::retain(&rows, min_area_percent, prefix);
    report.rows_retained = retained.len();
    info!(
        "Retention filter kept {} of {} rows ({} unique images).",
        retained.len(),
        rows.len(),
        retained
            .iter()
            .map(|row| row.image_filename.as_str())
            .collect::<HashSet<_>>()
            .len()
    );

    prune_directories(store, &retained, prefix, &mut report)?;
    prune_label_lines(store, &retained, &mut report)?;

    info!(
        "Synchronization complete: removed {} images, {} labels; rewrote {} label files ({} lines dropped).",
        report.images_removed, report.labels_removed, report.files_rewritten, report.lines_removed
    );
    Ok(report)
}

/// Delete every prefix-scoped image (and its paired label) whose filename
/// is absent from the retained row set.
fn prune_directories(
    store: &CombinedStore,
    retained: &[BoxRow],
    prefix: Option<&str>,
    report: &mut SyncReport,
) -> Result<()> {
    let keep: HashSet<&str> = retained
        .iter()
        .map(|row| row.image_filename.as_str())
        .collect();

    for file_name in store.image_file_names()? {
        if let Some(p) = prefix {
            if !file_name.starts_with(p) {
                continue;
            }
        }
        if keep.contains(file_name.as_str()) {
            continue;
        }

        let (image_removed, label_removed) = store.remove_pair(&file_name);
        if image_removed {
            report.images_removed += 1;
        }
        if label_removed {
            report.labels_removed += 1;
        }
    }

    Ok(())
}

/// For every image that still has retained annotations, drop label-file
/// lines that no retained row regenerates. Files are rewritten only when at
/// least one line was actually removed.
fn prune_label_lines(
    store: &CombinedStore,
    retained: &[BoxRow],
    report: &mut SyncReport,
) -> Result<()> {
    let mut by_image: BTreeMap<&str, Vec<&BoxRow>> = BTreeMap::new();
    for row in retained {
        by_image.entry(&row.image_filename).or_default().push(row);
    }

    for (image_filename, rows) in by_image {
        let Some(base_name) = Path::new(image_filename).file_stem().and_then(|s| s.to_str())
        else {
            continue;
        };
        if !store.label_path(base_name).exists() {
            continue;
        }

        let valid_lines: HashSet<String> = rows.iter().map(|row| row.to_label_line()).collect();

        let existing = store.read_label_lines(base_name)?;
        let kept: Vec<String> = existing
            .iter()
            .filter(|line| valid_lines.contains(*line))
            .cloned()
            .collect();

        if kept.len() != existing.len() {
            info!(
                "Updating label file for {}. Removed {} extra entries.",
                image_filename,
                existing.len() - kept.len()
            );
            report.lines_removed += existing.len() - kept.len();
            report.files_rewritten += 1;
            store.write_label_lines(base_name, &kept)?;
        }
    }

    Ok(())
}

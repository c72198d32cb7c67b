use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{get_image_extensions_set, IMG_FORMATS};
use crate::utils::ensure_directory;

/// The combined dataset store: sibling `images/` and `labels/` directories
/// in which an image file and at most one label file share a base filename.
///
/// All mutation of the store goes through this type, so the consistency
/// rules between the two trees live in one place.
#[derive(Debug, Clone)]
pub struct CombinedStore {
    root: PathBuf,
    images_dir: PathBuf,
    labels_dir: PathBuf,
}

impl CombinedStore {
    /// Open an existing store, creating the `images/` and `labels/`
    /// directories if absent.
    pub fn create(root: &Path) -> Result<Self> {
        let images_dir = ensure_directory(&root.join("images"))?;
        let labels_dir = ensure_directory(&root.join("labels"))?;
        Ok(Self {
            root: root.to_path_buf(),
            images_dir,
            labels_dir,
        })
    }

    /// Open an existing store; both directory trees must already exist.
    pub fn open(root: &Path) -> Result<Self> {
        let images_dir = root.join("images");
        let labels_dir = root.join("labels");
        if !images_dir.is_dir() {
            return Err(Error::MissingInput(images_dir));
        }
        if !labels_dir.is_dir() {
            return Err(Error::MissingInput(labels_dir));
        }
        Ok(Self {
            root: root.to_path_buf(),
            images_dir,
            labels_dir,
        })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn labels_dir(&self) -> &Path {
        &self.labels_dir
    }

    /// Default location of the tabular index CSV.
    pub fn index_path(&self) -> PathBuf {
        self.root.join("meta").join("bounding_boxes.csv")
    }

    /// File names (with extension) of every image in the store, sorted.
    /// Only files with a recognized image extension are listed.
    pub fn image_file_names(&self) -> Result<Vec<String>> {
        let extensions = get_image_extensions_set();
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.images_dir)? {
            let entry = entry?;
            let path = entry.path();
            let has_image_ext = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext.to_lowercase()));
            if path.is_file() && has_image_ext {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Base filenames (stems) of every image in the store, sorted.
    pub fn base_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .image_file_names()?
            .iter()
            .filter_map(|name| Path::new(name).file_stem().and_then(|s| s.to_str()))
            .map(|stem| stem.to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Paths of every label file in the store, sorted by filename.
    pub fn label_files(&self) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.labels_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "txt")
            })
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Resolve an image path for a base filename by probing the recognized
    /// extensions in order.
    pub fn find_image(&self, base_name: &str) -> Option<PathBuf> {
        IMG_FORMATS
            .iter()
            .map(|ext| self.images_dir.join(format!("{}.{}", base_name, ext)))
            .find(|candidate| candidate.exists())
    }

    /// Path of the label file for a base filename (which may not exist).
    pub fn label_path(&self, base_name: &str) -> PathBuf {
        self.labels_dir.join(format!("{}.txt", base_name))
    }

    /// Copy an image into the store under the given file name.
    pub fn put_image(&self, source: &Path, file_name: &str) -> Result<()> {
        fs::copy(source, self.images_dir.join(file_name))?;
        Ok(())
    }

    /// Write a label file for a base filename, one line per annotation.
    pub fn write_label_lines(&self, base_name: &str, lines: &[String]) -> Result<()> {
        let mut content = String::with_capacity(lines.len() * 40);
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        fs::write(self.label_path(base_name), content)?;
        Ok(())
    }

    /// Read the trimmed, non-empty lines of a label file.
    pub fn read_label_lines(&self, base_name: &str) -> Result<Vec<String>> {
        let content = fs::read_to_string(self.label_path(base_name))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Remove an image file and its paired label file, if present.
    /// Returns `(image_removed, label_removed)`; failures are logged, not
    /// propagated, since pruning is best-effort cleanup.
    pub fn remove_pair(&self, image_file_name: &str) -> (bool, bool) {
        let image_path = self.images_dir.join(image_file_name);
        let image_removed = match fs::remove_file(&image_path) {
            Ok(()) => {
                log::debug!("Deleted image: {}", image_path.display());
                true
            }
            Err(e) => {
                log::warn!("Failed to delete image {}: {}", image_path.display(), e);
                false
            }
        };

        let label_removed = match Path::new(image_file_name).file_stem().and_then(|s| s.to_str())
        {
            Some(stem) => {
                let label_path = self.label_path(stem);
                if label_path.exists() {
                    match fs::remove_file(&label_path) {
                        Ok(()) => {
                            log::debug!("Deleted label: {}", label_path.display());
                            true
                        }
                        Err(e) => {
                            log::warn!(
                                "Failed to delete label {}: {}",
                                label_path.display(),
                                e
                            );
                            false
                        }
                    }
                } else {
                    false
                }
            }
            None => false,
        };

        (image_removed, label_removed)
    }
}

//! Loading and saving batches as folders of image files.
//!
//! Used by the command-line front end; the nodes themselves never touch the
//! filesystem except through a [`FileResolver`](crate::core::resolve::FileResolver).

use crate::core::batch::ImageBatch;
use crate::core::error::{BatchUtilsError, BatchUtilsResult};
use crate::core::resolve::has_image_extension;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Image files directly inside `dir`, sorted by file name.
pub fn list_images(dir: impl AsRef<Path>) -> BatchUtilsResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(BatchUtilsError::Other(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_image_extension(e.path()))
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load every image in `dir` into one RGB batch.
///
/// Items are ordered by file name. Images whose size differs from the first
/// one are resized to match it with `filter`.
pub fn load_batch_from_dir(dir: impl AsRef<Path>, filter: FilterType) -> BatchUtilsResult<ImageBatch> {
    let dir = dir.as_ref();
    let paths = list_images(dir)?;
    if paths.is_empty() {
        return Err(BatchUtilsError::Other(format!(
            "No images found in '{}'",
            dir.display()
        )));
    }

    let mut target: Option<(u32, u32)> = None;
    let mut items = Vec::with_capacity(paths.len());
    for path in &paths {
        let image = image::open(path).map_err(|source| BatchUtilsError::ImageLoad {
            path: path.clone(),
            source,
        })?;

        let (width, height) = *target.get_or_insert((image.width(), image.height()));
        let image = if (image.width(), image.height()) != (width, height) {
            log::debug!("Resizing {} to {}x{}", path.display(), width, height);
            image.resize_exact(width, height, filter)
        } else {
            image
        };
        items.push(ImageBatch::from_image(&image));
    }

    log::debug!("Loaded {} images from {}", items.len(), dir.display());
    Ok(ImageBatch::concat(&items)?)
}

/// Save each batch item as `<prefix>_<index>.png` in `dir`.
///
/// The folder is created if needed. Returns the written paths in item order.
pub fn save_batch(batch: &ImageBatch, dir: impl AsRef<Path>, prefix: &str) -> BatchUtilsResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let mut saved = Vec::with_capacity(batch.len());
    for index in 0..batch.len() {
        let Some(image) = batch.item_to_image(index) else {
            continue;
        };
        let path = dir.join(format!("{}_{:05}.png", prefix, index));
        image.save(&path).map_err(|source| BatchUtilsError::ImageSave {
            path: path.clone(),
            source,
        })?;
        saved.push(path);
    }
    Ok(saved)
}

//! Album directory scanning.
//!
//! The albums root holds one folder per member; the images directly inside a
//! folder are that member's photos:
//!
//! ```text
//! public/photos/albums/
//! ├── Alice Mendoza/
//! │   ├── 01.jpg
//! │   └── 02.png
//! ├── Bob Reyes/
//! │   └── portrait.webp
//! └── Carol/                 # no images: not reported at all
//!     └── notes.txt
//! ```
//!
//! Only one level is examined; nested folders inside a member's folder are
//! ignored. Output order is lexicographic by folder name, then by file name,
//! so repeated scans of an unchanged tree give identical results.

use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read album directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Extensions (lowercase) that count as member photos.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A member folder and the photos found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFolder {
    /// Folder name with surrounding whitespace trimmed.
    pub name: String,
    /// Image filenames, sorted, trimmed.
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub folders: Vec<ScannedFolder>,
    /// The albums root did not exist. `folders` is empty in that case.
    pub root_missing: bool,
}

/// Scan `root` for member folders that contain at least one image.
pub fn scan(root: &Path) -> Result<ScanOutcome, ScanError> {
    if !root.is_dir() {
        warn!(path = %root.display(), "albums path does not exist");
        return Ok(ScanOutcome {
            folders: Vec::new(),
            root_missing: true,
        });
    }

    let mut folders = Vec::new();
    for entry in immediate_children(root) {
        let Some(entry) = usable(entry)? else {
            continue;
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let raw = entry.file_name().to_string_lossy();
        let name = raw.trim();
        if name.is_empty() {
            warn!(folder = ?raw, "skipping folder with a blank name");
            continue;
        }

        let images = collect_images(entry.path())?;
        if images.is_empty() {
            debug!(folder = name, "no images, skipping");
            continue;
        }
        debug!(folder = name, images = images.len(), "found member folder");
        folders.push(ScannedFolder {
            name: name.to_string(),
            images,
        });
    }

    Ok(ScanOutcome {
        folders,
        root_missing: false,
    })
}

/// Direct children of `dir`, sorted by file name. Symlinks are followed so a
/// linked album folder counts like a real one.
fn immediate_children(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

fn collect_images(folder: &Path) -> Result<Vec<String>, ScanError> {
    let mut images = Vec::new();
    for entry in immediate_children(folder) {
        let Some(entry) = usable(entry)? else {
            continue;
        };
        if entry.file_type().is_file() && is_image(entry.path()) {
            let filename = entry.file_name().to_string_lossy();
            images.push(filename.trim().to_string());
        }
    }
    Ok(images)
}

/// Failing to read the directory itself is an error; a single child that
/// cannot be inspected (a dangling symlink, say) is skipped.
fn usable(
    entry: Result<walkdir::DirEntry, walkdir::Error>,
) -> Result<Option<walkdir::DirEntry>, ScanError> {
    match entry {
        Ok(e) => Ok(Some(e)),
        Err(e) if e.depth() > 0 => {
            warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

//! Image discovery and thumbnail decoding for the strip.
//!
//! This module performs filesystem reads and returns plain data structures.
//! No UI or Ratatui types are used here.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// One image in the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEntry {
    pub path: PathBuf,
    pub name: String,
}

impl GalleryEntry {
    pub fn from_path(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// True when the extension names a format the `image` crate can decode here.
pub fn is_image_path(path: &Path) -> bool {
    ImageFormat::from_path(path)
        .map(|f| f.reading_enabled())
        .unwrap_or(false)
}

/// Collect images under `root`, sorted case-insensitively by file name.
///
/// With `recursive == false` only immediate children are considered.
/// Hidden (dot-prefixed) entries are skipped.
pub fn discover_images(root: &Path, recursive: bool) -> Result<Vec<GalleryEntry>, GalleryError> {
    if !root.is_dir() {
        return Err(GalleryError::NotADirectory(root.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_string_lossy().as_ref()));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            // The root itself failing is fatal; anything below is skipped.
            Err(e) if e.depth() == 0 => {
                return Err(GalleryError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_file() && is_image_path(entry.path()) {
            entries.push(GalleryEntry::from_path(entry.path()));
        }
    }

    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });
    tracing::debug!(count = entries.len(), root = %root.display(), "discovered images");
    Ok(entries)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Decode `path` and shrink it to fit within `max_w × max_h`, keeping the
/// aspect ratio.  Images already small enough are left at full size.
pub fn load_thumbnail(path: &Path, max_w: u32, max_h: u32) -> Result<RgbaImage, GalleryError> {
    let img = image::open(path).map_err(|source| GalleryError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let img = if img.width() > max_w || img.height() > max_h {
        img.thumbnail(max_w.max(1), max_h.max(1))
    } else {
        img
    };
    Ok(img.to_rgba8())
}

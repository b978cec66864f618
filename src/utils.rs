use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Read `(width, height)` from an image header without decoding pixels.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32)> {
    let size = imagesize::size(path).map_err(|source| Error::ImageDimensions {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((size.width as u32, size.height as u32))
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Delete `path` if it exists and create it empty
pub fn create_output_directory(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        log::warn!(
            "Directory {:?} already exists. Deleting and recreating it.",
            path
        );
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Create `path` if missing, keeping whatever it already holds
pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Remove a file left without its counterpart. Returns whether it is gone.
pub fn remove_orphan(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            log::warn!("Removed orphaned {}", path.display());
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            log::warn!("Could not remove orphaned {}: {}", path.display(), e);
            false
        }
    }
}

/// Sorted regular files directly inside `dir` matching `pattern` (a glob such as `*.txt`).
pub fn list_files(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let Some(dir_str) = dir.to_str() else {
        log::error!("Path is not valid UTF-8: {:?}", dir);
        return Vec::new();
    };
    let full = format!("{}/{}", glob::Pattern::escape(dir_str), pattern);
    let mut files: Vec<PathBuf> = match glob::glob(&full) {
        Ok(paths) => paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            log::error!("Invalid glob pattern {:?}: {}", full, e);
            Vec::new()
        }
    };
    files.sort();
    files
}

/// File stem as an owned string, or an empty string when there is none.
pub fn file_stem_string(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

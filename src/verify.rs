use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::DATASET_YAML;
use crate::types::{OutputDirs, Split};
use crate::utils::list_files;

const SAMPLE_LABELS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirStatus {
    pub path: PathBuf,
    /// `None` when the directory is missing
    pub file_count: Option<usize>,
}

impl DirStatus {
    fn inspect(path: &Path) -> Self {
        let file_count = fs::read_dir(path)
            .ok()
            .map(|entries| entries.filter_map(|entry| entry.ok()).count());
        Self {
            path: path.to_path_buf(),
            file_count,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.file_count, Some(count) if count > 0)
    }
}

/// State of a converted dataset on disk.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub dirs: Vec<DirStatus>,
    pub dataset_yaml_present: bool,
    /// `(label file name, defect count)` for a few training labels
    pub sample_labels: Vec<(String, usize)>,
}

impl VerificationReport {
    pub fn is_ready(&self) -> bool {
        self.dataset_yaml_present && self.dirs.iter().all(DirStatus::is_ready)
    }

    pub fn log_summary(&self) {
        info!("=== Dataset Verification ===");
        for dir in &self.dirs {
            match dir.file_count {
                Some(0) => warn!("{}: empty", dir.path.display()),
                Some(count) => info!("{}: {} file(s)", dir.path.display(), count),
                None => warn!("{}: missing", dir.path.display()),
            }
        }
        for (name, count) in &self.sample_labels {
            info!("{}: {} defect(s)", name, count);
        }
        if self.dataset_yaml_present {
            info!("{}: present", DATASET_YAML);
        } else {
            warn!("{}: missing", DATASET_YAML);
        }

        if self.is_ready() {
            info!("Dataset structure is ready for training.");
        } else {
            warn!("There are issues with the dataset structure.");
        }
    }
}

/// Inspect the split directories and descriptor under `root`.
pub fn verify_dataset(root: &Path) -> VerificationReport {
    let output_dirs = OutputDirs::new(root);

    let mut dirs = Vec::with_capacity(6);
    for split in Split::ALL {
        dirs.push(DirStatus::inspect(output_dirs.images_dir(split)));
    }
    for split in Split::ALL {
        dirs.push(DirStatus::inspect(output_dirs.labels_dir(split)));
    }

    let sample_labels = list_files(output_dirs.labels_dir(Split::Train), "*.txt")
        .into_iter()
        .take(SAMPLE_LABELS)
        .filter_map(|path| {
            let content = fs::read_to_string(&path).ok()?;
            let defects = content.lines().filter(|l| !l.trim().is_empty()).count();
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some((name, defects))
        })
        .collect();

    VerificationReport {
        dirs,
        dataset_yaml_present: root.join(DATASET_YAML).is_file(),
        sample_labels,
    }
}

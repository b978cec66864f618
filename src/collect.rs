use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::conversion::convert_annotation_file;
use crate::error::{Error, Result};
use crate::types::{ProcessingStats, UnifiedDirs, RAW_IMAGE_FORMATS};
use crate::utils::{ensure_directory, file_stem_string, list_files, remove_orphan};

const GROUP_PREFIX: &str = "group";

/// The image and annotation subdirectories of one raw group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    pub name: String,
    pub image_dir: PathBuf,
    pub annotation_dir: PathBuf,
}

/// Sorted `group*` subdirectories of the raw root.
pub fn find_group_dirs(raw_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(raw_dir).map_err(|e| Error::io(raw_dir, e))?;
    let mut groups: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(GROUP_PREFIX))
        })
        .collect();
    groups.sort();
    Ok(groups)
}

/// Identify a group's image and annotation subdirectories.
///
/// Returns `None` when either one is missing.
pub fn resolve_group_layout(group_dir: &Path, annotation_suffix: &str) -> Option<GroupLayout> {
    let name = group_dir.file_name()?.to_string_lossy().into_owned();

    let mut subdirs: Vec<PathBuf> = match fs::read_dir(group_dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect(),
        Err(e) => {
            error!("Failed to read group directory {}: {}", group_dir.display(), e);
            return None;
        }
    };
    subdirs.sort();

    let (annotation_dirs, image_dirs): (Vec<_>, Vec<_>) = subdirs.into_iter().partition(|path| {
        path.file_name()
            .map(|n| n.to_string_lossy().ends_with(annotation_suffix))
            .unwrap_or(false)
    });

    if annotation_dirs.len() > 1 || image_dirs.len() > 1 {
        warn!(
            "{}: found {} annotation and {} image directories, using the first of each",
            name,
            annotation_dirs.len(),
            image_dirs.len()
        );
    }

    match (image_dirs.into_iter().next(), annotation_dirs.into_iter().next()) {
        (Some(image_dir), Some(annotation_dir)) => Some(GroupLayout {
            name,
            image_dir,
            annotation_dir,
        }),
        _ => None,
    }
}

/// Locate the `<base>_test.<ext>` image for an annotation base name.
pub fn find_test_image(image_dir: &Path, base_name: &str) -> Option<PathBuf> {
    RAW_IMAGE_FORMATS
        .iter()
        .map(|ext| image_dir.join(format!("{}_test.{}", base_name, ext)))
        .find(|path| path.is_file())
}

/// Convert and copy every annotated test image of one group into the unified dirs.
pub fn collect_group(group: &GroupLayout, unified: &UnifiedDirs, stats: &mut ProcessingStats) {
    let annotation_files = list_files(&group.annotation_dir, "*.txt");
    info!(
        "Processing {}: {} annotation file(s)",
        group.name,
        annotation_files.len()
    );

    for annotation_path in annotation_files {
        stats.annotation_files += 1;
        let base_name = file_stem_string(&annotation_path);

        let Some(image_path) = find_test_image(&group.image_dir, &base_name) else {
            warn!("No test image found for {}/{}", group.name, base_name);
            stats.skipped_missing_image += 1;
            continue;
        };

        let unique_stem =
            sanitize_filename::sanitize(format!("{}_{}", group.name, base_name));
        let label_output = unified.labels_dir.join(format!("{}.txt", unique_stem));
        let image_extension = image_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let image_output = unified
            .images_dir
            .join(format!("{}.{}", unique_stem, image_extension));

        if let Err(e) = convert_annotation_file(&annotation_path, &image_path, &label_output, stats)
        {
            error!("Failed to convert {}: {}", annotation_path.display(), e);
            stats.files_failed += 1;
            continue;
        }

        if let Err(e) = fs::copy(&image_path, &image_output) {
            error!(
                "Failed to copy {} to {}: {}",
                image_path.display(),
                image_output.display(),
                e
            );
            stats.files_failed += 1;
            // A label without its image would never pair; drop it too.
            remove_orphan(&label_output);
            continue;
        }

        stats.files_converted += 1;
    }
}

/// Walk every group under `raw_dir` and fill the unified image/label directories.
///
/// Fails when no group exists or when not a single file could be converted.
pub fn collect_dataset(
    raw_dir: &Path,
    output_root: &Path,
    annotation_suffix: &str,
) -> Result<ProcessingStats> {
    let group_dirs = find_group_dirs(raw_dir)?;
    if group_dirs.is_empty() {
        return Err(Error::NoGroups(raw_dir.to_path_buf()));
    }
    info!("Found {} group(s) in {}", group_dirs.len(), raw_dir.display());

    let unified = UnifiedDirs::new(output_root);
    ensure_directory(&unified.images_dir)?;
    ensure_directory(&unified.labels_dir)?;

    let mut stats = ProcessingStats::new();
    for group_dir in &group_dirs {
        match resolve_group_layout(group_dir, annotation_suffix) {
            Some(layout) => {
                collect_group(&layout, &unified, &mut stats);
                stats.groups_processed += 1;
            }
            None => {
                warn!(
                    "Skipping {} - missing image or annotation directory",
                    group_dir.display()
                );
                stats.groups_skipped += 1;
            }
        }
    }

    stats.print_summary();

    if stats.files_converted == 0 {
        return Err(Error::NothingConverted(raw_dir.to_path_buf()));
    }
    Ok(stats)
}

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collect::collect_dataset;
use crate::config::{PrepareArgs, SplitArgs};
use crate::error::{Error, Result};
use crate::io::{create_class_mapping, create_dataset_yaml, setup_output_directories};
use crate::matcher::{matcher_for, PairMatcher};
use crate::types::{OutputDirs, SamplePair, Split, SplitData, SplitRatios, UnifiedDirs};
use crate::utils::{create_progress_bar, file_stem_string, list_files, remove_orphan};
use crate::verify::{verify_dataset, VerificationReport};

// Absorbs float error in cumulative ratios, e.g. 0.7 + 0.2 = 0.8999999999999999
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Pair every label in `labels_dir` with an image from `images_dir`.
///
/// Labels without an image are logged and dropped.
pub fn collect_pairs(
    images_dir: &Path,
    labels_dir: &Path,
    matcher: &dyn PairMatcher,
) -> Vec<SamplePair> {
    let images = list_files(images_dir, "*");
    let labels = list_files(labels_dir, "*.txt");

    let mut pairs = Vec::with_capacity(labels.len());
    for label in labels {
        let stem = file_stem_string(&label);
        match matcher.find_image(&stem, images_dir, &images) {
            Some(image) => pairs.push(SamplePair::new(image, label)),
            None => warn!("No image found for label {}", label.display()),
        }
    }
    pairs
}

fn boundary(n: usize, ratio: f64) -> usize {
    ((n as f64 * ratio + BOUNDARY_EPSILON).floor() as usize).min(n)
}

/// Shuffle the pairs and slice them into train, validation, and test sets.
///
/// Without a seed the shuffle draws from OS entropy and is not reproducible.
pub fn split_pairs(mut pairs: Vec<SamplePair>, ratios: SplitRatios, seed: Option<u64>) -> SplitData {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            info!("No seed given; the split will not be reproducible.");
            StdRng::from_entropy()
        }
    };
    pairs.shuffle(&mut rng);

    let n = pairs.len();
    let train_end = boundary(n, ratios.train);
    let val_end = boundary(n, ratios.train + ratios.val).max(train_end);

    let test = pairs.split_off(val_end);
    let val = pairs.split_off(train_end);

    SplitData {
        train: pairs,
        val,
        test,
    }
}

fn copy_into(source: &Path, dest_dir: &Path) -> std::io::Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let dest = dest_dir.join(file_name);
    fs::copy(source, &dest)?;
    Ok(dest)
}

fn copy_pair(pair: &SamplePair, output_dirs: &OutputDirs, split: Split) -> std::io::Result<()> {
    let image = copy_into(&pair.image, output_dirs.images_dir(split))?;
    if let Err(e) = copy_into(&pair.label, output_dirs.labels_dir(split)) {
        remove_orphan(&image);
        return Err(e);
    }
    Ok(())
}

/// Copy each split's images and labels into its output directories.
///
/// A failed copy is logged and only skips that pair. An image whose label
/// could not be copied is removed again.
/// Returns how many pairs were copied.
pub fn materialize_split(split_data: &SplitData, output_dirs: &OutputDirs) -> usize {
    let mut copied = 0;
    for split in Split::ALL {
        let pairs = split_data.get(split);
        info!("Processing {} split: {} pair(s)", split.dir_name(), pairs.len());

        let pb = create_progress_bar(pairs.len() as u64, split.label());
        for pair in pairs {
            match copy_pair(pair, output_dirs, split) {
                Ok(()) => copied += 1,
                Err(e) => error!(
                    "Failed to copy pair ({}, {}): {}",
                    pair.image.display(),
                    pair.label.display(),
                    e
                ),
            }
            pb.inc(1);
        }
        pb.finish_with_message(format!("{} processing complete", split.label()));
    }
    copied
}

/// Split the unified set under `args.output_dir` and write the descriptor files.
pub fn split_dataset(args: &SplitArgs) -> Result<SplitData> {
    let ratios = SplitRatios::new(args.train_size, args.val_size, args.test_size)?;
    let root = &args.output_dir;
    let unified = UnifiedDirs::new(root);

    let matcher = matcher_for(args.matcher);
    let pairs = collect_pairs(&unified.images_dir, &unified.labels_dir, matcher.as_ref());
    info!("Found {} valid image-label pairs", pairs.len());
    if pairs.is_empty() {
        return Err(Error::NoValidPairs(unified.labels_dir));
    }

    let split_data = split_pairs(pairs, ratios, args.seed);
    let output_dirs = setup_output_directories(root)?;
    let copied = materialize_split(&split_data, &output_dirs);
    if copied < split_data.len() {
        warn!("{} pair(s) could not be copied", split_data.len() - copied);
    }

    info!(
        "Final split: train {}, val {}, test {}",
        split_data.train.len(),
        split_data.val.len(),
        split_data.test.len()
    );

    info!("Creating dataset.yaml file...");
    let yaml_path = create_dataset_yaml(root, &args.class_names)?;
    info!("Created {}", yaml_path.display());
    let mapping_path = create_class_mapping(root, &args.class_names)?;
    info!("Created {}", mapping_path.display());

    Ok(split_data)
}

/// Main dataset processing pipeline: collect, split, describe, verify.
pub fn prepare_dataset(args: &PrepareArgs) -> Result<VerificationReport> {
    let collect_args = args.collect_args();
    collect_dataset(
        &collect_args.raw_dir,
        &collect_args.output_dir,
        &collect_args.annotation_suffix,
    )?;

    split_dataset(&args.split)?;

    let report = verify_dataset(&args.split.output_dir);
    report.log_summary();
    Ok(report)
}

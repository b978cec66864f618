use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::DEFAULT_CLASS_NAMES;

/// Convert the DeepPCB defect dataset into a YOLO training layout.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert raw group annotations and gather them into a flat unified set
    Collect(CollectArgs),
    /// Split the unified set into train/val/test and write dataset.yaml
    Split(SplitArgs),
    /// Run collect and split back to back, then verify the result
    Prepare(PrepareArgs),
    /// Check that the split layout and dataset.yaml are ready for training
    Verify(VerifyArgs),
    /// Draw externally produced detections on top of an image
    Overlay(OverlayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Root of the raw dataset, containing the group* directories
    #[arg(short = 'r', long = "raw_dir")]
    pub raw_dir: PathBuf,

    /// Root of the converted dataset
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Name suffix that marks a group's annotation subdirectory
    #[arg(long = "annotation_suffix", default_value = "_not")]
    pub annotation_suffix: String,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Root of the converted dataset
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_size", default_value_t = 0.7, value_parser = validate_size)]
    pub train_size: f64,

    /// Proportion of the dataset to use for validation
    #[arg(long = "val_size", default_value_t = 0.2, value_parser = validate_size)]
    pub val_size: f64,

    /// Proportion of the dataset to use for testing
    #[arg(long = "test_size", default_value_t = 0.1, value_parser = validate_size)]
    pub test_size: f64,

    /// Seed for random shuffling; omit for a non-reproducible split
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// How labels are paired with images
    #[arg(long = "matcher", value_enum, default_value = "fuzzy")]
    pub matcher: MatcherKind,

    /// Ordered class names written to dataset.yaml
    #[arg(long = "class_names", value_delimiter = ',', default_values_t = default_class_names())]
    pub class_names: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PrepareArgs {
    /// Root of the raw dataset, containing the group* directories
    #[arg(short = 'r', long = "raw_dir")]
    pub raw_dir: PathBuf,

    /// Name suffix that marks a group's annotation subdirectory
    #[arg(long = "annotation_suffix", default_value = "_not")]
    pub annotation_suffix: String,

    #[command(flatten)]
    pub split: SplitArgs,
}

impl PrepareArgs {
    pub fn collect_args(&self) -> CollectArgs {
        CollectArgs {
            raw_dir: self.raw_dir.clone(),
            output_dir: self.split.output_dir.clone(),
            annotation_suffix: self.annotation_suffix.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Root of the converted dataset
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct OverlayArgs {
    /// Image the detections were produced for
    #[arg(short = 'i', long = "image")]
    pub image: PathBuf,

    /// JSON array of {x1, y1, x2, y2, confidence, class_id} in pixels
    #[arg(short = 'd', long = "detections")]
    pub detections: PathBuf,

    /// Where to save the annotated image
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Detections below this confidence are dropped
    #[arg(long = "min_confidence", default_value_t = 0.25, value_parser = validate_confidence)]
    pub min_confidence: f32,

    /// Ordered class names used to label detections
    #[arg(long = "class_names", value_delimiter = ',', default_values_t = default_class_names())]
    pub class_names: Vec<String>,
}

// Pairing strategy used by the splitter
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum MatcherKind {
    /// Only accept images sharing the label's base name
    Exact,
    /// Exact first, then fall back to shared name tokens
    Fuzzy,
}

fn default_class_names() -> Vec<String> {
    DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect()
}

// Validate that the size is between 0.0 and 1.0
fn validate_size(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("SIZE must be between 0.0 and 1.0".to_string()),
    }
}

fn validate_confidence(s: &str) -> Result<f32, String> {
    match f32::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("CONFIDENCE must be between 0.0 and 1.0".to_string()),
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

// Extensions tried, in order, for a raw group's `<base>_test.<ext>` image
pub const RAW_IMAGE_FORMATS: &[&str] = &["jpg", "png", "jpeg"];

// Extensions tried, in order, when pairing a unified label with its image
pub const PAIR_IMAGE_FORMATS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// Class names in YOLO (0-based) order.
pub const DEFAULT_CLASS_NAMES: &[&str] = &[
    "open",
    "short",
    "mousebite",
    "spur",
    "pin-hole",
    "spurious_copper",
];

/// One defect box as found in a raw annotation file, in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub class_id: i64,
}

/// A defect box in normalized center/size form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub class_id: i64,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloBox {
    /// Map back to absolute `(x1, y1, x2, y2)` for an image of `width`x`height`.
    pub fn denormalize(&self, width: u32, height: u32) -> (f64, f64, f64, f64) {
        let (w, h) = (width as f64, height as f64);
        (
            (self.x_center - self.width / 2.0) * w,
            (self.y_center - self.height / 2.0) * h,
            (self.x_center + self.width / 2.0) * w,
            (self.y_center + self.height / 2.0) * h,
        )
    }
}

impl fmt::Display for YoloBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// An image file and the label file describing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplePair {
    pub image: PathBuf,
    pub label: PathBuf,
}

impl SamplePair {
    pub fn new(image: impl Into<PathBuf>, label: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Split::Train => "Train",
            Split::Val => "Val",
            Split::Test => "Test",
        }
    }
}

/// Target proportions of the three splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    const SUM_TOLERANCE: f64 = 1e-6;

    pub fn new(train: f64, val: f64, test: f64) -> crate::Result<Self> {
        for (name, value) in [("train", train), ("val", val), ("test", test)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::Error::InvalidRatios(format!(
                    "{} ratio {} is outside [0, 1]",
                    name, value
                )));
            }
        }
        let sum = train + val + test;
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(crate::Error::InvalidRatios(format!(
                "ratios must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(Self { train, val, test })
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            val: 0.2,
            test: 0.1,
        }
    }
}

// Struct to hold the split datasets for training, validation, and testing
#[derive(Debug, Clone, Default)]
pub struct SplitData {
    pub train: Vec<SamplePair>,
    pub val: Vec<SamplePair>,
    pub test: Vec<SamplePair>,
}

impl SplitData {
    pub fn get(&self, split: Split) -> &[SamplePair] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Struct to hold the paths to the split output directories
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
    pub test_images_dir: PathBuf,
    pub train_labels_dir: PathBuf,
    pub val_labels_dir: PathBuf,
    pub test_labels_dir: PathBuf,
}

impl OutputDirs {
    pub fn new(root: &Path) -> Self {
        let images = root.join("images");
        let labels = root.join("labels");
        Self {
            train_images_dir: images.join(Split::Train.dir_name()),
            val_images_dir: images.join(Split::Val.dir_name()),
            test_images_dir: images.join(Split::Test.dir_name()),
            train_labels_dir: labels.join(Split::Train.dir_name()),
            val_labels_dir: labels.join(Split::Val.dir_name()),
            test_labels_dir: labels.join(Split::Test.dir_name()),
        }
    }

    pub fn images_dir(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.train_images_dir,
            Split::Val => &self.val_images_dir,
            Split::Test => &self.test_images_dir,
        }
    }

    pub fn labels_dir(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.train_labels_dir,
            Split::Val => &self.val_labels_dir,
            Split::Test => &self.test_labels_dir,
        }
    }
}

/// Flat intermediate directories filled by the collector.
#[derive(Debug, Clone)]
pub struct UnifiedDirs {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

impl UnifiedDirs {
    pub fn new(root: &Path) -> Self {
        let unified = root.join("unified");
        Self {
            images_dir: unified.join("images"),
            labels_dir: unified.join("labels"),
        }
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub groups_processed: usize,
    pub groups_skipped: usize,
    pub annotation_files: usize,
    pub files_converted: usize,
    pub files_failed: usize,
    pub skipped_missing_image: usize,
    pub lines_converted: usize,
    pub lines_skipped: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Collection Summary ===");
        log::info!(
            "Groups processed: {} (skipped: {})",
            self.groups_processed,
            self.groups_skipped
        );
        log::info!("Annotation files found: {}", self.annotation_files);
        log::info!("Successful conversions: {}", self.files_converted);
        log::info!("Failed conversions: {}", self.files_failed);
        log::info!("Skipped (no test image): {}", self.skipped_missing_image);
        log::info!(
            "Defect boxes written: {} (malformed lines skipped: {})",
            self.lines_converted,
            self.lines_skipped
        );

        if self.lines_skipped > 0 || self.skipped_missing_image > 0 {
            log::warn!(
                "Some input was dropped: {} malformed line(s), {} annotation(s) without image",
                self.lines_skipped,
                self.skipped_missing_image
            );
        }
    }
}

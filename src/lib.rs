//! DeepPCB to YOLO dataset converter
//!
//! This library converts the DeepPCB defect annotations into YOLO label files,
//! splits the result into train/val/test sets, and writes the dataset
//! descriptor a YOLO trainer expects.

pub mod collect;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod matcher;
pub mod overlay;
pub mod types;
pub mod utils;
pub mod verify;

// Re-export commonly used types and functions
pub use collect::collect_dataset;
pub use config::{Cli, Command, MatcherKind};
pub use dataset::{prepare_dataset, split_dataset, split_pairs};
pub use error::{Error, LineError, Result};
pub use types::{OutputDirs, RawBox, SamplePair, Split, SplitData, SplitRatios, YoloBox};
pub use verify::{verify_dataset, VerificationReport};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole pipeline step.
///
/// Per-file and per-line problems are logged and skipped instead; only the
/// variants below ever reach `main`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read image dimensions of {}: {}", .path.display(), .source)]
    ImageDimensions {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("image {} reports a zero width or height", .0.display())]
    EmptyImage(PathBuf),

    #[error("failed to decode or encode image {}: {}", .path.display(), .source)]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to parse detections file {}: {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load the label font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("invalid split ratios: {0}")]
    InvalidRatios(String),

    #[error("no group directories found under {}", .0.display())]
    NoGroups(PathBuf),

    #[error("no annotation files could be converted under {}", .0.display())]
    NothingConverted(PathBuf),

    #[error("no valid image-label pairs found in {}", .0.display())]
    NoValidPairs(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a single raw annotation line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected at least 5 fields, found {0}")]
    TooFewFields(usize),

    #[error("field {index} ({value:?}) is not an integer")]
    InvalidInteger { index: usize, value: String },
}

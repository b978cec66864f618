//! Pairing of unified label files with their images.
//!
//! The collector names both files `<group>_<base>`, so an exact base-name
//! match normally succeeds. [`FuzzyMatcher`] adds a token-based fallback for
//! layouts produced by other tools; it may pick the wrong image and should be
//! swapped for [`ExactMatcher`] when mismatches are unacceptable.

use log::debug;
use std::path::{Path, PathBuf};

use crate::config::MatcherKind;
use crate::types::PAIR_IMAGE_FORMATS;
use crate::utils::file_stem_string;

// Tokens this short are too generic to identify an image
const MIN_TOKEN_LEN: usize = 4;

/// Finds the image belonging to a label file.
pub trait PairMatcher {
    /// `images` holds every candidate image, sorted.
    fn find_image(&self, label_stem: &str, images_dir: &Path, images: &[PathBuf])
        -> Option<PathBuf>;
}

/// Accepts only an image sharing the label's base name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl PairMatcher for ExactMatcher {
    fn find_image(
        &self,
        label_stem: &str,
        images_dir: &Path,
        _images: &[PathBuf],
    ) -> Option<PathBuf> {
        let stripped = label_stem.replace("group", "");
        PAIR_IMAGE_FORMATS
            .iter()
            .flat_map(|ext| {
                [
                    images_dir.join(format!("{}.{}", label_stem, ext)),
                    images_dir.join(format!("{}.{}", stripped, ext)),
                ]
            })
            .find(|path| path.is_file())
    }
}

/// Exact match first, then the first image whose name contains one of the
/// label's underscore-separated tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct FuzzyMatcher;

impl PairMatcher for FuzzyMatcher {
    fn find_image(
        &self,
        label_stem: &str,
        images_dir: &Path,
        images: &[PathBuf],
    ) -> Option<PathBuf> {
        if let Some(found) = ExactMatcher.find_image(label_stem, images_dir, images) {
            return Some(found);
        }

        let tokens: Vec<&str> = label_stem
            .split('_')
            .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
            .collect();
        if tokens.is_empty() {
            return None;
        }

        let found = images
            .iter()
            .find(|image| {
                let image_stem = file_stem_string(image);
                tokens.iter().any(|token| image_stem.contains(token))
            })
            .cloned();
        if let Some(image) = &found {
            debug!(
                "Fuzzy-matched label {:?} to image {}",
                label_stem,
                image.display()
            );
        }
        found
    }
}

pub fn matcher_for(kind: MatcherKind) -> Box<dyn PairMatcher> {
    match kind {
        MatcherKind::Exact => Box::new(ExactMatcher),
        MatcherKind::Fuzzy => Box::new(FuzzyMatcher),
    }
}

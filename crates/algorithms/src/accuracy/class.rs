//! Binary forest / non-forest classes

use lucsample_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Binary land-cover class used for accuracy assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandCover {
    NonForest = 0,
    Forest = 1,
}

impl LandCover {
    /// Interpreted-label literal for this class
    pub fn label(self) -> &'static str {
        match self {
            LandCover::NonForest => "non-forest",
            LandCover::Forest => "forest",
        }
    }

    /// Row / column index in a confusion matrix
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for LandCover {
    type Err = Error;

    /// Case-insensitive match against `forest` / `non-forest`. Surrounding
    /// whitespace is not trimmed.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        [LandCover::Forest, LandCover::NonForest]
            .into_iter()
            .find(|class| lower == class.label())
            .ok_or_else(|| Error::InvalidLabel {
                feature: None,
                value: s.to_string(),
            })
    }
}

impl fmt::Display for LandCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Class predicted from a zonal statistic: forest when `mean_statistic < threshold`.
///
/// A NaN statistic compares false and so yields non-forest.
pub fn predicted_class(mean_statistic: f64, threshold: f64) -> LandCover {
    if mean_statistic < threshold {
        LandCover::Forest
    } else {
        LandCover::NonForest
    }
}

/// Class from an interpreted label; anything but forest / non-forest fails.
pub fn actual_class(label: &str) -> Result<LandCover> {
    label.parse()
}

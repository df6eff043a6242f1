//! Binary confusion matrix
//!
//! Cells are indexed `[actual][predicted]`, giving the fixed layout
//! `[[tn, fp], [fn, tp]]` with forest as the positive class.

use super::class::LandCover;
use lucsample_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// 2x2 tally of predicted against actual classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    cells: [[u64; 2]; 2],
}

impl ConfusionMatrix {
    /// Build a matrix from explicit counts
    pub fn from_counts(tn: u64, fp: u64, fn_: u64, tp: u64) -> Self {
        Self {
            cells: [[tn, fp], [fn_, tp]],
        }
    }

    /// Tally paired class sequences. Pairs are matched by index; sequences
    /// of different length are rejected.
    pub fn from_classes(actual: &[LandCover], predicted: &[LandCover]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(Error::LengthMismatch {
                left_name: "actual classes",
                left: actual.len(),
                right_name: "predicted classes",
                right: predicted.len(),
            });
        }

        let mut cells = [[0u64; 2]; 2];
        for (a, p) in actual.iter().zip(predicted) {
            cells[a.index()][p.index()] += 1;
        }
        Ok(Self { cells })
    }

    /// Count for one `(actual, predicted)` pair
    pub fn cell(&self, actual: LandCover, predicted: LandCover) -> u64 {
        self.cells[actual.index()][predicted.index()]
    }

    /// Rows `[[tn, fp], [fn, tp]]`
    pub fn rows(&self) -> [[u64; 2]; 2] {
        self.cells
    }

    pub fn true_negatives(&self) -> u64 {
        self.cells[0][0]
    }

    pub fn false_positives(&self) -> u64 {
        self.cells[0][1]
    }

    pub fn false_negatives(&self) -> u64 {
        self.cells[1][0]
    }

    pub fn true_positives(&self) -> u64 {
        self.cells[1][1]
    }

    /// Number of plots tallied
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Share of plots on the diagonal
    pub fn overall_accuracy(&self) -> Option<f64> {
        ratio(self.true_positives() + self.true_negatives(), self.total())
    }

    /// Share of actual forest plots predicted as forest
    pub fn producers_accuracy(&self) -> Option<f64> {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_negatives(),
        )
    }

    /// Share of predicted forest plots that are actually forest
    pub fn users_accuracy(&self) -> Option<f64> {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_positives(),
        )
    }
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

impl fmt::Display for ConfusionMatrix {
    /// Right-aligned, equal-width integers: `[[tn fp]\n [fn tp]]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .cells
            .iter()
            .flatten()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        let [[tn, fp], [fn_, tp]] = self.cells;
        write!(
            f,
            "[[{tn:>w$} {fp:>w$}]\n [{fn_:>w$} {tp:>w$}]]",
            w = width
        )
    }
}

impl FromStr for ConfusionMatrix {
    type Err = Error;

    /// Read back the four counts in row order, ignoring brackets and spacing.
    /// Anything other than an unsigned integer between them is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let counts = s
            .split(|c: char| c.is_whitespace() || c == '[' || c == ']')
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                if !tok.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::InvalidValue {
                        field: "confusion matrix".into(),
                        value: tok.to_string(),
                        reason: "not an unsigned integer count".into(),
                    });
                }
                tok.parse::<u64>().map_err(|e| Error::InvalidValue {
                    field: "confusion matrix".into(),
                    value: tok.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<u64>>>()?;

        match counts[..] {
            [tn, fp, fn_, tp] => Ok(Self::from_counts(tn, fp, fn_, tp)),
            _ => Err(Error::InvalidValue {
                field: "confusion matrix".into(),
                value: s.to_string(),
                reason: format!("expected 4 counts, found {}", counts.len()),
            }),
        }
    }
}

//! Accuracy assessment of interpreted samples
//!
//! - **class**: forest / non-forest labelling of statistics and labels
//! - **matrix**: binary confusion matrix
//! - **report**: plain-text report file
//! - **pipeline**: zonal mean, labelling and tallying over a plot layer

mod class;
mod matrix;
mod pipeline;
mod report;

pub use class::{actual_class, predicted_class, LandCover};
pub use matrix::ConfusionMatrix;
pub use pipeline::{
    evaluate_accuracy, run_sample_accuracy, InterpretationType, SampleAccuracy,
    SampleAccuracyFiles, SampleAccuracyInput, SampleAccuracyOutput, SampleAccuracyParams,
};
pub use report::{read_report, write_report};

//! Plain-text accuracy report

use super::matrix::ConfusionMatrix;
use lucsample_core::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Write the confusion matrix to `path`, replacing any previous content.
pub fn write_report<P: AsRef<Path>>(matrix: &ConfusionMatrix, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, format!("{}\n", matrix))?;
    debug!("Wrote accuracy report to {}", path.display());
    Ok(())
}

/// Read a report written by [`write_report`]
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<ConfusionMatrix> {
    fs::read_to_string(path)?.parse()
}

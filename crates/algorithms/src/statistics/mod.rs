//! Statistical summaries of raster data
//!
//! - **zonal**: Statistics of raster cells inside polygon features

pub mod zonal;

pub use zonal::{zonal_statistics, ZonalParams, ZonalResult, ZonalStatistic};

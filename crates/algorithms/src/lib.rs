//! # lucsample algorithms
//!
//! Processing algorithms for land-use/land-cover sampling.
//!
//! ## Available Algorithm Categories
//!
//! - **accuracy**: Forest / non-forest accuracy of interpreted samples
//! - **collect_earth**: Collect Earth CSV exports to plot polygons
//! - **statistics**: Zonal statistics over polygon layers
//! - **vector**: Point buffering

pub mod accuracy;
pub mod collect_earth;
pub mod statistics;
pub mod vector;

/// Group every algorithm of this crate is listed under
pub const GROUP: &str = "LUC Sampling";

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::accuracy::{
        actual_class, evaluate_accuracy, predicted_class, run_sample_accuracy, write_report,
        ConfusionMatrix, InterpretationType, LandCover, SampleAccuracy, SampleAccuracyFiles,
        SampleAccuracyParams,
    };
    pub use crate::collect_earth::{
        collect_earth_to_vector, run_collect_earth_to_vector, CollectEarthParams,
        CollectEarthToVector,
    };
    pub use crate::statistics::{zonal_statistics, ZonalParams, ZonalStatistic};
    pub use crate::vector::{buffer_features, buffer_point, BufferParams, EndCapStyle};
    pub use lucsample_core::prelude::*;
}

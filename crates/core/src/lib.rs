//! # lucsample core
//!
//! Core types, traits and I/O for land-use/land-cover sampling workflows.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS` and `CoordinateTransform`: reference systems and WGS84 reprojection
//! - `FeatureCollection` and `EditSession`: vector layers with scoped edits
//! - I/O for GeoTIFF, GeoJSON and CSV
//! - Algorithm trait for a consistent API

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::{CoordinateTransform, CRS};
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AttributeValue, EditSession, Feature, FeatureCollection, Field, FieldType};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::{CoordinateTransform, CRS};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection, Field, FieldType};
    pub use crate::Algorithm;
}

/// Core trait for all processing algorithms.
///
/// Algorithms transform input data according to parameters. Each run is
/// independent; nothing is shared between invocations.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns the group the algorithm is listed under
    fn group(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

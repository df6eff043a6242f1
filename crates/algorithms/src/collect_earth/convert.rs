//! Collect Earth output to vector
//!
//! Reads a Collect Earth CSV export, reprojects each plot location from
//! WGS84 into a projected CRS and buffers it into a square plot polygon.

use super::schema::{coerce, plot_fields, remap_record};
use crate::vector::{buffer_features, BufferParams};
use geo::Point;
use lucsample_core::io::{read_csv, write_geojson, CsvRecord};
use lucsample_core::vector::{AttributeValue, Feature, FeatureCollection};
use lucsample_core::{Algorithm, CoordinateTransform, Error, Result, CRS};
use std::path::Path;
use tracing::{debug, info, warn};

/// Parameters for Collect Earth conversion
#[derive(Debug, Clone)]
pub struct CollectEarthParams {
    /// Projected CRS of the output layer
    pub output_crs: CRS,
    /// Side of the square plot, in output CRS units (default: 10)
    pub plot_size: f64,
}

impl Default for CollectEarthParams {
    fn default() -> Self {
        Self {
            output_crs: CRS::wgs84(),
            plot_size: 10.0,
        }
    }
}

impl CollectEarthParams {
    /// Check the parameters and build the WGS84 → output transform.
    ///
    /// Geographic output systems, non-positive plot sizes and output systems
    /// without a supported transform are rejected.
    pub fn validate(&self) -> Result<CoordinateTransform> {
        if self.output_crs.is_geographic() {
            return Err(Error::GeographicCrs(self.output_crs.identifier()));
        }
        if !(self.plot_size.is_finite() && self.plot_size > 0.0) {
            return Err(Error::InvalidParameter {
                name: "plot_size",
                value: self.plot_size.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        CoordinateTransform::new(&CRS::wgs84(), &self.output_crs)
    }
}

/// Convert Collect Earth rows into buffered plot polygons
pub fn collect_earth_to_vector(
    records: &[CsvRecord],
    params: &CollectEarthParams,
) -> Result<FeatureCollection> {
    let transform = params.validate()?;
    convert_records(records, &transform, params.plot_size)
}

/// Convert a Collect Earth CSV file into a GeoJSON plot layer.
///
/// Parameters are checked before the input is opened. Returns the number
/// of plots written.
pub fn run_collect_earth_to_vector<P, Q>(input: P, output: Q, params: &CollectEarthParams) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let transform = params.validate()?;

    let records = read_csv(input.as_ref())?;
    debug!("Read {} rows from {}", records.len(), input.as_ref().display());

    let plots = convert_records(&records, &transform, params.plot_size)?;
    write_geojson(&plots, output)?;
    Ok(plots.len())
}

fn convert_records(
    records: &[CsvRecord],
    transform: &CoordinateTransform,
    plot_size: f64,
) -> Result<FeatureCollection> {
    let target = transform.target();
    let srs = target.authid().unwrap_or_else(|| target.identifier());
    let mut points = FeatureCollection::with_fields(plot_fields(), Some(target.clone()));

    for (row, record) in records.iter().enumerate() {
        let plot = remap_record(record)?;
        let (x, y) = transform.transform(plot.longitude, plot.latitude)?;

        let mut feature = Feature::new(Point::new(x, y).into());
        for (name, field_type, raw) in plot.iter() {
            let value = match name {
                "SRS" => AttributeValue::String(srs.clone()),
                "X" => AttributeValue::Float(x),
                "Y" => AttributeValue::Float(y),
                _ => coerce(raw, field_type).unwrap_or_else(|| {
                    warn!("Row {}: {} value {:?} is not a number, stored as NULL", row + 1, name, raw);
                    AttributeValue::Null
                }),
            };
            feature.set_property(name, value);
        }
        points.push(feature);
    }

    info!("Converted {} plots to {}", points.len(), srs);
    buffer_features(&points, &BufferParams::square(plot_size / 2.0))
}

/// Collect Earth output to vector algorithm
#[derive(Debug, Clone, Default)]
pub struct CollectEarthToVector;

impl Algorithm for CollectEarthToVector {
    type Input = Vec<CsvRecord>;
    type Output = FeatureCollection;
    type Params = CollectEarthParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Collect Earth output to vector"
    }

    fn group(&self) -> &'static str {
        crate::GROUP
    }

    fn description(&self) -> &'static str {
        "Convert Collect Earth CSV exports to square plot polygons in a projected CRS"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        collect_earth_to_vector(&input, &params)
    }
}

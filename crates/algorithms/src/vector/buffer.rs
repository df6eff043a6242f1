//! Point buffering
//!
//! Turns point features into polygons: circles for a round end cap,
//! axis-aligned squares for a square end cap (the Collect Earth plot shape).

use geo::{Geometry, LineString, Point, Polygon};
use lucsample_core::vector::{Feature, FeatureCollection};
use lucsample_core::{Error, Result};
use std::f64::consts::PI;

/// End cap style applied to buffered points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndCapStyle {
    /// Circle approximated with `segments` vertices
    #[default]
    Round,
    /// Square of side `2 * distance` centred on the point
    Square,
}

/// Parameters for buffer operations
#[derive(Debug, Clone)]
pub struct BufferParams {
    /// Buffer distance (absolute value is used for points)
    pub distance: f64,
    /// Number of segments to approximate curves (default: 16)
    pub segments: usize,
    pub end_cap: EndCapStyle,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            distance: 1.0,
            segments: 16,
            end_cap: EndCapStyle::Round,
        }
    }
}

impl BufferParams {
    /// Square-cap buffer at `distance`
    pub fn square(distance: f64) -> Self {
        Self {
            distance,
            end_cap: EndCapStyle::Square,
            ..Self::default()
        }
    }
}

/// Buffer a single point.
pub fn buffer_point(point: &Point<f64>, params: &BufferParams) -> Polygon<f64> {
    let r = params.distance.abs();
    let (cx, cy) = (point.x(), point.y());

    let mut coords = match params.end_cap {
        EndCapStyle::Round => {
            let n = params.segments.max(4);
            (0..n)
                .map(|i| {
                    let angle = 2.0 * PI * i as f64 / n as f64;
                    (cx + r * angle.cos(), cy + r * angle.sin())
                })
                .collect::<Vec<_>>()
        }
        EndCapStyle::Square => vec![
            (cx - r, cy - r),
            (cx + r, cy - r),
            (cx + r, cy + r),
            (cx - r, cy + r),
        ],
    };
    // Close the ring
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Buffer every point feature of a layer.
///
/// Attributes, feature order, schema and CRS are carried over; features
/// without geometry are kept as they are. Non-point geometries fail with
/// [`Error::UnsupportedGeometry`].
pub fn buffer_features(layer: &FeatureCollection, params: &BufferParams) -> Result<FeatureCollection> {
    let mut output = FeatureCollection::with_fields(layer.fields.clone(), layer.crs.clone());

    for (index, feature) in layer.iter().enumerate() {
        let geometry = match &feature.geometry {
            None => None,
            Some(Geometry::Point(p)) => Some(Geometry::Polygon(buffer_point(p, params))),
            Some(Geometry::MultiPoint(mp)) => Some(Geometry::MultiPolygon(
                mp.iter().map(|p| buffer_point(p, params)).collect(),
            )),
            Some(_) => {
                return Err(Error::UnsupportedGeometry(format!(
                    "feature {} is not a point; only points can be buffered",
                    index
                )))
            }
        };

        output.push(Feature {
            geometry,
            properties: feature.properties.clone(),
            id: feature.id.clone(),
        });
    }

    Ok(output)
}

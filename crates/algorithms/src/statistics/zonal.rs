//! Zonal statistics over polygon features
//!
//! For every polygon of a layer, summarises the raster cells whose centre
//! falls inside it. Polygons smaller than a cell, which contain no cell
//! centre, take the single cell under their centroid.

use geo::{BoundingRect, Centroid, Contains, Geometry, MultiPolygon, Point};
use lucsample_core::raster::Raster;
use lucsample_core::vector::{AttributeValue, Feature, FeatureCollection, Field, FieldType};
use lucsample_core::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// Available zonal statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonalStatistic {
    Count,
    Sum,
    Mean,
    Median,
    StdDev,
    Min,
    Max,
    Range,
    Minority,
    Majority,
    Variety,
}

impl ZonalStatistic {
    /// Output column suffix, appended to the column prefix
    pub fn suffix(self) -> &'static str {
        match self {
            ZonalStatistic::Count => "count",
            ZonalStatistic::Sum => "sum",
            ZonalStatistic::Mean => "mean",
            ZonalStatistic::Median => "median",
            ZonalStatistic::StdDev => "stdev",
            ZonalStatistic::Min => "min",
            ZonalStatistic::Max => "max",
            ZonalStatistic::Range => "range",
            ZonalStatistic::Minority => "minority",
            ZonalStatistic::Majority => "majority",
            ZonalStatistic::Variety => "variety",
        }
    }
}

/// Parameters for polygon zonal statistics
#[derive(Debug, Clone)]
pub struct ZonalParams {
    /// Prefix for output columns (default `_`, giving `_mean`, ...)
    pub column_prefix: String,
    pub statistics: Vec<ZonalStatistic>,
}

impl Default for ZonalParams {
    fn default() -> Self {
        Self {
            column_prefix: "_".to_string(),
            statistics: vec![ZonalStatistic::Mean],
        }
    }
}

impl ZonalParams {
    pub fn column_name(&self, statistic: ZonalStatistic) -> String {
        format!("{}{}", self.column_prefix, statistic.suffix())
    }
}

/// Summary of the valid cells of one zone
#[derive(Debug, Clone, Default)]
pub struct ZonalResult {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub minority: f64,
    pub majority: f64,
    pub variety: usize,
}

impl ZonalResult {
    /// Summarise a set of cell values. `None` when there are none.
    pub fn from_values(mut vals: Vec<f64>) -> Option<Self> {
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let sum: f64 = vals.iter().sum();
        let mean = sum / count as f64;
        let var = vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;

        vals.sort_by(f64::total_cmp);
        let min = vals[0];
        let max = vals[count - 1];

        let median = if count % 2 == 0 {
            (vals[count / 2 - 1] + vals[count / 2]) / 2.0
        } else {
            vals[count / 2]
        };

        // Runs of equal values in the sorted list; ties go to the smallest value
        let mut runs: Vec<(f64, usize)> = Vec::new();
        for &v in &vals {
            match runs.last_mut() {
                Some((last, n)) if *last == v => *n += 1,
                _ => runs.push((v, 1)),
            }
        }
        let majority = runs
            .iter()
            .fold(runs[0], |best, &run| if run.1 > best.1 { run } else { best })
            .0;
        let minority = runs
            .iter()
            .fold(runs[0], |best, &run| if run.1 < best.1 { run } else { best })
            .0;

        Some(Self {
            count,
            sum,
            mean,
            median,
            std_dev: var.sqrt(),
            min,
            max,
            range: max - min,
            minority,
            majority,
            variety: runs.len(),
        })
    }

    pub fn get(&self, statistic: ZonalStatistic) -> f64 {
        match statistic {
            ZonalStatistic::Count => self.count as f64,
            ZonalStatistic::Sum => self.sum,
            ZonalStatistic::Mean => self.mean,
            ZonalStatistic::Median => self.median,
            ZonalStatistic::StdDev => self.std_dev,
            ZonalStatistic::Min => self.min,
            ZonalStatistic::Max => self.max,
            ZonalStatistic::Range => self.range,
            ZonalStatistic::Minority => self.minority,
            ZonalStatistic::Majority => self.majority,
            ZonalStatistic::Variety => self.variety as f64,
        }
    }
}

/// Compute zonal statistics for every polygon of a layer.
///
/// Returns a new layer with the same features in the same order plus one
/// Double column per requested statistic. Zones without a valid cell get
/// Null, except `count` which is 0.
///
/// # Arguments
/// * `layer` - Polygon or MultiPolygon features
/// * `values` - Raster band to summarise
/// * `params` - Statistics and output column prefix
pub fn zonal_statistics(
    layer: &FeatureCollection,
    values: &Raster<f64>,
    params: &ZonalParams,
) -> Result<FeatureCollection> {
    if let (Some(a), Some(b)) = (layer.crs.as_ref(), values.crs()) {
        if !a.is_equivalent(b) {
            return Err(Error::CrsMismatch(a.identifier(), b.identifier()));
        }
    }

    let mut fields = layer.fields.clone();
    for &stat in &params.statistics {
        let name = params.column_name(stat);
        if !fields.iter().any(|f| f.name == name) {
            fields.push(Field::new(name, FieldType::Double));
        }
    }
    let mut output = FeatureCollection::with_fields(fields, layer.crs.clone());

    let mut empty_zones = 0usize;
    for (index, feature) in layer.iter().enumerate() {
        let zone = zone_polygons(index, feature)?;
        let result = ZonalResult::from_values(zone_values(&zone, values));
        if result.is_none() {
            empty_zones += 1;
        }

        let mut properties: HashMap<String, AttributeValue> = feature.properties.clone();
        for &stat in &params.statistics {
            let value = match (&result, stat) {
                (Some(r), _) => AttributeValue::Float(r.get(stat)),
                (None, ZonalStatistic::Count) => AttributeValue::Float(0.0),
                (None, _) => AttributeValue::Null,
            };
            properties.insert(params.column_name(stat), value);
        }

        output.push(Feature {
            geometry: feature.geometry.clone(),
            properties,
            id: feature.id.clone(),
        });
    }

    debug!(
        "Zonal statistics: {} zones, {} without valid cells",
        output.len(),
        empty_zones
    );
    Ok(output)
}

fn zone_polygons(index: usize, feature: &Feature) -> Result<MultiPolygon<f64>> {
    match &feature.geometry {
        Some(Geometry::Polygon(p)) => Ok(MultiPolygon::new(vec![p.clone()])),
        Some(Geometry::MultiPolygon(mp)) => Ok(mp.clone()),
        Some(_) => Err(Error::UnsupportedGeometry(format!(
            "feature {} is not a polygon; zonal statistics need polygon zones",
            index
        ))),
        None => Err(Error::UnsupportedGeometry(format!(
            "feature {} has no geometry",
            index
        ))),
    }
}

/// Valid cell values inside a zone
fn zone_values(zone: &MultiPolygon<f64>, raster: &Raster<f64>) -> Vec<f64> {
    let Some(rect) = zone.bounding_rect() else {
        return Vec::new();
    };
    let (rows, cols) = raster.shape();
    let envelope = (rect.min().x, rect.min().y, rect.max().x, rect.max().y);

    let mut vals = Vec::new();
    let mut centres_inside = 0usize;

    if let Some((r0, r1, c0, c1)) = raster.transform().pixel_window(envelope, rows, cols) {
        for row in r0..=r1 {
            for col in c0..=c1 {
                let (x, y) = raster.pixel_to_geo(col, row);
                if !zone.contains(&Point::new(x, y)) {
                    continue;
                }
                centres_inside += 1;
                if let Some(v) = raster.valid_value(row, col) {
                    vals.push(v);
                }
            }
        }
    }

    if centres_inside == 0 {
        if let Some(centroid) = zone.centroid() {
            if let Some((row, col)) = raster.pixel_at(centroid.x(), centroid.y()) {
                vals.extend(raster.valid_value(row, col));
            }
        }
    }

    vals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{LineString, Polygon};
    use lucsample_core::{GeoTransform, CRS};

    fn square(x0: f64, y0: f64, size: f64) -> Geometry<f64> {
        Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
            vec![],
        )
        .into()
    }

    /// 4x4 raster of 10 m cells covering (0,0)-(40,40); value = row * 4 + col
    fn ramp() -> Raster<f64> {
        let data = (0..16).map(|v| v as f64).collect();
        let mut raster = Raster::from_vec(data, 4, 4).unwrap();
        raster.set_transform(GeoTransform::new(0.0, 40.0, 10.0, -10.0));
        raster
    }

    fn layer_of(geoms: Vec<Geometry<f64>>) -> FeatureCollection {
        let mut layer = FeatureCollection::new();
        for g in geoms {
            layer.push(Feature::new(g));
        }
        layer
    }

    #[test]
    fn test_zonal_mean_by_cell_centre() {
        // Top-left 2x2 cells: values 0, 1, 4, 5
        let layer = layer_of(vec![square(0.0, 20.0, 20.0)]);
        let out = zonal_statistics(&layer, &ramp(), &ZonalParams::default()).unwrap();

        assert!(out.field("_mean").is_some());
        let mean = out.features[0].get_property("_mean").and_then(AttributeValue::as_f64);
        assert_relative_eq!(mean.unwrap(), 2.5);
    }

    #[test]
    fn test_small_plot_uses_centroid_cell() {
        // 2 m plot inside cell (row 2, col 1) without covering its centre
        let layer = layer_of(vec![square(11.0, 11.0, 2.0)]);
        let out = zonal_statistics(&layer, &ramp(), &ZonalParams::default()).unwrap();
        let mean = out.features[0].get_property("_mean").and_then(AttributeValue::as_f64);
        assert_relative_eq!(mean.unwrap(), 9.0);
    }

    #[test]
    fn test_zone_outside_raster_is_null() {
        let layer = layer_of(vec![square(500.0, 500.0, 10.0)]);
        let params = ZonalParams {
            statistics: vec![ZonalStatistic::Mean, ZonalStatistic::Count],
            ..Default::default()
        };
        let out = zonal_statistics(&layer, &ramp(), &params).unwrap();
        assert!(out.features[0].get_property("_mean").unwrap().is_null());
        assert_eq!(
            out.features[0].get_property("_count"),
            Some(&AttributeValue::Float(0.0))
        );
    }

    #[test]
    fn test_nodata_cells_skipped() {
        let mut raster = ramp();
        raster.set_nodata(Some(-1.0));
        raster.set(0, 0, -1.0).unwrap();
        raster.set(0, 1, f64::NAN).unwrap();

        let layer = layer_of(vec![square(0.0, 20.0, 20.0)]);
        let params = ZonalParams {
            statistics: vec![ZonalStatistic::Mean, ZonalStatistic::Count],
            ..Default::default()
        };
        let out = zonal_statistics(&layer, &raster, &params).unwrap();
        assert_eq!(
            out.features[0].get_property("_count"),
            Some(&AttributeValue::Float(2.0))
        );
        let mean = out.features[0].get_property("_mean").and_then(AttributeValue::as_f64);
        assert_relative_eq!(mean.unwrap(), 4.5);
    }

    #[test]
    fn test_order_and_attributes_preserved() {
        let mut layer = layer_of(vec![square(30.0, 30.0, 10.0), square(0.0, 0.0, 10.0)]);
        layer.fields.push(Field::new("label", FieldType::String));
        layer.features[0].set_property("label", AttributeValue::String("a".into()));
        layer.features[1].set_property("label", AttributeValue::String("b".into()));

        let out = zonal_statistics(&layer, &ramp(), &ZonalParams::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.fields[0].name, "label");
        assert_eq!(out.fields[1].name, "_mean");
        // top-right cell = 3, bottom-left cell = 12
        assert_eq!(out.features[0].get_property("_mean"), Some(&AttributeValue::Float(3.0)));
        assert_eq!(out.features[1].get_property("_mean"), Some(&AttributeValue::Float(12.0)));
        assert_eq!(
            out.features[1].get_property("label"),
            Some(&AttributeValue::String("b".into()))
        );
    }

    #[test]
    fn test_rejects_points_and_crs_mismatch() {
        let points = layer_of(vec![Point::new(5.0, 5.0).into()]);
        assert!(matches!(
            zonal_statistics(&points, &ramp(), &ZonalParams::default()),
            Err(Error::UnsupportedGeometry(_))
        ));

        let mut layer = layer_of(vec![square(0.0, 0.0, 10.0)]);
        layer.crs = Some(CRS::from_epsg(32630));
        let mut raster = ramp();
        raster.set_crs(Some(CRS::from_epsg(32631)));
        assert!(matches!(
            zonal_statistics(&layer, &raster, &ZonalParams::default()),
            Err(Error::CrsMismatch(..))
        ));
    }

    #[test]
    fn test_zonal_result_summary() {
        let r = ZonalResult::from_values(vec![3.0, 1.0, 2.0, 2.0]).unwrap();
        assert_eq!(r.count, 4);
        assert_relative_eq!(r.mean, 2.0);
        assert_relative_eq!(r.median, 2.0);
        assert_relative_eq!(r.range, 2.0);
        assert_relative_eq!(r.majority, 2.0);
        assert_relative_eq!(r.minority, 1.0);
        assert_eq!(r.variety, 3);
        assert!(ZonalResult::from_values(Vec::new()).is_none());
    }
}

//! CE interpreted sample accuracy
//!
//! Compares interpreted Collect Earth labels against a raster
//! classification. For every plot polygon the mean raster value is taken,
//! thresholded into forest / non-forest, stored back on the layer as
//! `<prefix>_MEAN`, and tallied against the interpreted label.

use super::class::{actual_class, predicted_class, LandCover};
use super::matrix::ConfusionMatrix;
use super::report::write_report;
use crate::statistics::{zonal_statistics, ZonalParams, ZonalStatistic};
use lucsample_core::io::{read_geojson, read_geotiff, write_geojson};
use lucsample_core::raster::Raster;
use lucsample_core::vector::{AttributeValue, FeatureCollection, Field, FieldType};
use lucsample_core::{Algorithm, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// How interpreted labels are compared with the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpretationType {
    /// Binary forest / non-forest, from the zonal mean
    #[default]
    ForestNonForest,
}

impl InterpretationType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterpretationType::ForestNonForest => "FOREST_NONFOREST",
        }
    }

    /// Zonal statistic the classification is derived from
    pub fn statistic(self) -> ZonalStatistic {
        match self {
            InterpretationType::ForestNonForest => ZonalStatistic::Mean,
        }
    }
}

impl FromStr for InterpretationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "FOREST_NONFOREST" => Ok(InterpretationType::ForestNonForest),
            _ => Err(Error::InvalidParameter {
                name: "interpretation_type",
                value: s.to_string(),
                reason: "supported types: FOREST_NONFOREST".into(),
            }),
        }
    }
}

impl fmt::Display for InterpretationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for sample accuracy
#[derive(Debug, Clone)]
pub struct SampleAccuracyParams {
    /// Layer column holding the interpreted label
    pub interpreted_field: String,
    pub interpretation_type: InterpretationType,
    /// Prefix of the statistic column added to the layer (`<prefix>_MEAN`)
    pub statistic_prefix: String,
    /// Plots with a mean below this value are predicted forest (default: 0.7)
    pub forest_class_threshold: f64,
}

impl Default for SampleAccuracyParams {
    fn default() -> Self {
        Self {
            interpreted_field: String::new(),
            interpretation_type: InterpretationType::ForestNonForest,
            statistic_prefix: String::new(),
            forest_class_threshold: 0.7,
        }
    }
}

impl SampleAccuracyParams {
    /// Name of the column the zonal statistic is stored under
    pub fn statistic_field(&self) -> String {
        format!("{}_MEAN", self.statistic_prefix)
    }
}

/// Evaluate interpreted labels against a raster.
///
/// On success the layer carries a new `<prefix>_MEAN` Double column with the
/// zonal mean of every plot. On any error the layer is left as it was.
pub fn evaluate_accuracy(
    layer: &mut FeatureCollection,
    raster: &Raster<f64>,
    params: &SampleAccuracyParams,
) -> Result<ConfusionMatrix> {
    if layer.field(&params.interpreted_field).is_none() {
        return Err(Error::InvalidParameter {
            name: "interpreted_field",
            value: params.interpreted_field.clone(),
            reason: "no such field in the input layer".into(),
        });
    }

    let statistic = params.interpretation_type.statistic();
    let zonal_params = ZonalParams {
        statistics: vec![statistic],
        ..ZonalParams::default()
    };
    let stat_column = zonal_params.column_name(statistic);
    let zonal = zonal_statistics(layer, raster, &zonal_params)?;

    if zonal.len() != layer.len() {
        return Err(Error::LengthMismatch {
            left_name: "zonal statistics",
            left: zonal.len(),
            right_name: "input layer",
            right: layer.len(),
        });
    }

    let new_field = params.statistic_field();
    let mut actual = Vec::with_capacity(layer.len());
    let mut predicted = Vec::with_capacity(layer.len());

    let mut session = layer.start_editing();
    session.add_field(Field::new(new_field.clone(), FieldType::Double))?;

    for (index, plot) in zonal.iter().enumerate() {
        let stat = match plot.get_property(&stat_column).and_then(AttributeValue::as_f64) {
            Some(v) if !v.is_nan() => v,
            _ => {
                warn!(
                    "Plot {} has no valid raster cells; classified as {}",
                    index,
                    LandCover::NonForest
                );
                f64::NAN
            }
        };

        let label = match plot.get_property(&params.interpreted_field) {
            Some(AttributeValue::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => AttributeValue::Null.to_string(),
        };
        let actual_value = actual_class(&label).map_err(|_| Error::InvalidLabel {
            feature: Some(index),
            value: label,
        })?;

        actual.push(actual_value);
        predicted.push(predicted_class(stat, params.forest_class_threshold));

        let stored = if stat.is_nan() {
            AttributeValue::Null
        } else {
            AttributeValue::Float(stat)
        };
        session.change_attribute_value(index, &new_field, stored)?;
    }

    let applied = session.commit();
    debug!("Stored {} values in field {}", applied, new_field);

    let matrix = ConfusionMatrix::from_classes(&actual, &predicted)?;
    log_metrics(&matrix);
    Ok(matrix)
}

fn log_metrics(matrix: &ConfusionMatrix) {
    info!("Plots evaluated: {}", matrix.total());
    let metrics = [
        ("Overall accuracy", matrix.overall_accuracy()),
        ("Producer's accuracy (forest)", matrix.producers_accuracy()),
        ("User's accuracy (forest)", matrix.users_accuracy()),
    ];
    for (name, value) in metrics {
        match value {
            Some(v) => info!("{}: {:.4}", name, v),
            None => info!("{}: undefined", name),
        }
    }
}

/// File locations for a sample accuracy run
#[derive(Debug, Clone)]
pub struct SampleAccuracyFiles {
    /// Interpreted plot polygons (GeoJSON)
    pub vector: PathBuf,
    /// Classification raster (GeoTIFF)
    pub raster: PathBuf,
    /// 1-based raster band
    pub band: usize,
    /// Text report with the confusion matrix
    pub report: PathBuf,
    /// Where the updated layer goes; the input vector when `None`
    pub layer_output: Option<PathBuf>,
}

/// Run sample accuracy from files: read both inputs, evaluate, write the
/// report and then the updated layer.
pub fn run_sample_accuracy(
    files: &SampleAccuracyFiles,
    params: &SampleAccuracyParams,
) -> Result<ConfusionMatrix> {
    if files.band == 0 {
        return Err(Error::InvalidParameter {
            name: "band",
            value: "0".into(),
            reason: "bands are numbered from 1".into(),
        });
    }

    let mut layer = read_geojson(&files.vector)?;
    let raster: Raster<f64> = read_geotiff(&files.raster, Some(files.band))?;
    debug!(
        "Loaded {} plots and a {}x{} raster",
        layer.len(),
        raster.cols(),
        raster.rows()
    );

    let matrix = evaluate_accuracy(&mut layer, &raster, params)?;
    write_report(&matrix, &files.report)?;

    let layer_path = files.layer_output.as_ref().unwrap_or(&files.vector);
    write_geojson(&layer, layer_path)?;
    Ok(matrix)
}

/// Input for [`SampleAccuracy`]
#[derive(Debug, Clone)]
pub struct SampleAccuracyInput {
    pub layer: FeatureCollection,
    pub raster: Raster<f64>,
}

/// Output of [`SampleAccuracy`]
#[derive(Debug, Clone)]
pub struct SampleAccuracyOutput {
    /// Input layer with the statistic column added
    pub layer: FeatureCollection,
    pub matrix: ConfusionMatrix,
}

/// CE interpreted sample accuracy algorithm
#[derive(Debug, Clone, Default)]
pub struct SampleAccuracy;

impl Algorithm for SampleAccuracy {
    type Input = SampleAccuracyInput;
    type Output = SampleAccuracyOutput;
    type Params = SampleAccuracyParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "CE Interpreted Sample Accuracy"
    }

    fn group(&self) -> &'static str {
        crate::GROUP
    }

    fn description(&self) -> &'static str {
        "Evaluate interpreted Collect Earth samples against a forest / non-forest raster"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let SampleAccuracyInput { mut layer, raster } = input;
        let matrix = evaluate_accuracy(&mut layer, &raster, &params)?;
        Ok(SampleAccuracyOutput { layer, matrix })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, LineString, Polygon};
    use lucsample_core::vector::Feature;
    use lucsample_core::GeoTransform;

    fn cell_plot(col: usize, row: usize) -> Geometry<f64> {
        // 2 m plot at the centre of a 10 m cell of the 2x2 test raster
        let (cx, cy) = (col as f64 * 10.0 + 5.0, 20.0 - row as f64 * 10.0 - 5.0);
        Polygon::new(
            LineString::from(vec![
                (cx - 1.0, cy - 1.0),
                (cx + 1.0, cy - 1.0),
                (cx + 1.0, cy + 1.0),
                (cx - 1.0, cy + 1.0),
                (cx - 1.0, cy - 1.0),
            ]),
            vec![],
        )
        .into()
    }

    /// Cells: [[0.2, 0.9], [0.5, 1.0]]
    fn raster() -> Raster<f64> {
        let mut r = Raster::from_vec(vec![0.2, 0.9, 0.5, 1.0], 2, 2).unwrap();
        r.set_transform(GeoTransform::new(0.0, 20.0, 10.0, -10.0));
        r
    }

    fn layer(labels: &[(usize, usize, &str)]) -> FeatureCollection {
        let mut layer = FeatureCollection::with_fields(
            vec![Field::new("LULC", FieldType::String)],
            None,
        );
        for &(col, row, label) in labels {
            let mut f = Feature::new(cell_plot(col, row));
            f.set_property("LULC", AttributeValue::String(label.into()));
            layer.push(f);
        }
        layer
    }

    fn params() -> SampleAccuracyParams {
        SampleAccuracyParams {
            interpreted_field: "LULC".into(),
            statistic_prefix: "ce".into(),
            ..Default::default()
        }
    }

    #[test]
    fn tallies_and_stores_means() {
        // means 0.2 (forest), 0.9 (non-forest), 0.5 (forest), 1.0 (non-forest)
        let mut layer = layer(&[
            (0, 0, "Forest"),
            (1, 0, "forest"),
            (0, 1, "NON-FOREST"),
            (1, 1, "non-forest"),
        ]);
        let matrix = evaluate_accuracy(&mut layer, &raster(), &params()).unwrap();

        assert_eq!(matrix.rows(), [[1, 1], [1, 1]]);
        assert_eq!(layer.fields.last().unwrap(), &Field::new("ce_MEAN", FieldType::Double));
        let means: Vec<_> = layer
            .iter()
            .map(|f| f.get_property("ce_MEAN").and_then(AttributeValue::as_f64).unwrap())
            .collect();
        assert_eq!(means, vec![0.2, 0.9, 0.5, 1.0]);
        assert!(layer.field("_mean").is_none());
    }

    #[test]
    fn rerun_gives_same_matrix() {
        let mut layer = layer(&[(0, 0, "forest"), (1, 1, "forest"), (1, 0, "non-forest")]);
        let first = evaluate_accuracy(&mut layer, &raster(), &params()).unwrap();
        let second = evaluate_accuracy(&mut layer, &raster(), &params()).unwrap();
        assert_eq!(first, second);
        assert_eq!(layer.fields.len(), 2);
    }

    #[test]
    fn invalid_label_leaves_layer_untouched() {
        let mut layer = layer(&[(0, 0, "forest"), (1, 0, "grassland"), (0, 1, "forest")]);
        let err = evaluate_accuracy(&mut layer, &raster(), &params()).unwrap_err();

        match err {
            Error::InvalidLabel { feature, value } => {
                assert_eq!(feature, Some(1));
                assert_eq!(value, "grassland");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(layer.fields.len(), 1);
        assert!(layer.iter().all(|f| f.get_property("ce_MEAN").is_none()));
    }

    #[test]
    fn null_label_is_invalid() {
        let mut layer = layer(&[(0, 0, "forest")]);
        layer.features[0].set_property("LULC", AttributeValue::Null);
        assert!(matches!(
            evaluate_accuracy(&mut layer, &raster(), &params()),
            Err(Error::InvalidLabel { feature: Some(0), .. })
        ));
    }

    #[test]
    fn plot_outside_raster_is_non_forest() {
        let mut layer = layer(&[(0, 0, "forest")]);
        let mut outside = Feature::new(cell_plot(50, 50));
        outside.set_property("LULC", AttributeValue::String("forest".into()));
        layer.push(outside);

        let matrix = evaluate_accuracy(&mut layer, &raster(), &params()).unwrap();
        // second plot: actual forest, predicted non-forest
        assert_eq!(matrix.rows(), [[0, 0], [1, 1]]);
        assert!(layer.features[1].get_property("ce_MEAN").unwrap().is_null());
    }

    #[test]
    fn unknown_field_rejected() {
        let mut layer = layer(&[(0, 0, "forest")]);
        let params = SampleAccuracyParams {
            interpreted_field: "land_use".into(),
            ..params()
        };
        assert!(matches!(
            evaluate_accuracy(&mut layer, &raster(), &params),
            Err(Error::InvalidParameter { name: "interpreted_field", .. })
        ));
    }

    #[test]
    fn threshold_moves_decision() {
        let mut layer = layer(&[(0, 1, "forest"), (1, 0, "forest")]);
        let strict = SampleAccuracyParams {
            forest_class_threshold: 0.3,
            ..params()
        };
        let matrix = evaluate_accuracy(&mut layer, &raster(), &strict).unwrap();
        assert_eq!(matrix.false_negatives(), 2);
    }

    #[test]
    fn interpretation_type_parsing() {
        assert_eq!(
            "FOREST_NONFOREST".parse::<InterpretationType>().unwrap(),
            InterpretationType::ForestNonForest
        );
        assert_eq!(
            "forest-nonforest".parse::<InterpretationType>().unwrap(),
            InterpretationType::ForestNonForest
        );
        assert!("LAND_USE".parse::<InterpretationType>().is_err());
        assert_eq!(InterpretationType::default().statistic(), ZonalStatistic::Mean);
    }

    #[test]
    fn algorithm_metadata() {
        let alg = SampleAccuracy;
        assert_eq!(alg.name(), "CE Interpreted Sample Accuracy");
        assert_eq!(alg.group(), "LUC Sampling");

        let out = alg
            .execute(
                SampleAccuracyInput {
                    layer: layer(&[(0, 0, "forest")]),
                    raster: raster(),
                },
                params(),
            )
            .unwrap();
        assert_eq!(out.matrix.true_positives(), 1);
        assert!(out.layer.field("ce_MEAN").is_some());
    }
}

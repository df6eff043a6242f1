//! Collect Earth export schema
//!
//! A Collect Earth CSV export carries a plot per row with survey metadata,
//! a WGS84 location and per-period land-use interpretations. Bookkeeping
//! columns and per-year snapshot columns are dropped; the remaining values
//! map in column order onto [`PLOT_FIELDS`].

use lucsample_core::io::CsvRecord;
use lucsample_core::vector::{AttributeValue, Field, FieldType};
use lucsample_core::{Error, Result};

/// Columns never carried into the plot layer
pub const DROPPED_COLUMNS: [&str; 4] = [
    "actively_saved",
    "subcategory",
    "landuse_subcategory",
    "deforestation_nature",
];

/// Column stems that are dropped when directly suffixed by a year
/// (`land_use2015`, `confidence2000`, ...)
pub const YEARLY_COLUMNS: [&str; 3] = ["image_source", "land_use", "confidence"];

pub const LOCATION_X: &str = "location_x";
pub const LOCATION_Y: &str = "location_y";

/// Output schema of the plot layer, in column order
pub static PLOT_FIELDS: [(&str, FieldType); 21] = [
    ("Plot_id", FieldType::Int),
    ("SRS", FieldType::String),
    ("X", FieldType::Double),
    ("Y", FieldType::Double),
    ("operator", FieldType::String),
    ("savedYear", FieldType::Int),
    ("savedMonth", FieldType::Int),
    ("savedDay", FieldType::Int),
    ("plot_file", FieldType::String),
    ("sourceStYr", FieldType::String),
    ("dateStYr", FieldType::Int),
    ("LULC_StYr", FieldType::String),
    ("subCl_StYr", FieldType::String),
    ("conf_StYr", FieldType::String),
    ("sourceEnYr", FieldType::String),
    ("dateEnYr", FieldType::Int),
    ("LULC_EnYr", FieldType::String),
    ("subCl_EnYr", FieldType::String),
    ("deforType", FieldType::String),
    ("conf_EnYr", FieldType::String),
    ("comments", FieldType::String),
];

/// Plot layer schema as fields
pub fn plot_fields() -> Vec<Field> {
    PLOT_FIELDS
        .iter()
        .map(|&(name, field_type)| Field::new(name, field_type))
        .collect()
}

/// Byte offset of the first run of four ASCII digits
fn first_year(name: &str) -> Option<usize> {
    name.as_bytes()
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
}

/// Whether a CSV column is left out of the plot layer
pub fn is_dropped_column(name: &str) -> bool {
    if DROPPED_COLUMNS.contains(&name) {
        return true;
    }
    // Text between the first year and its next occurrence must be empty,
    // so `land_use2015` and `land_use20152015` both go
    match first_year(name) {
        Some(i) => {
            let (year, rest) = (&name[i..i + 4], &name[i + 4..]);
            (rest.is_empty() || rest.starts_with(year)) && YEARLY_COLUMNS.contains(&&name[..i])
        }
        None => false,
    }
}

/// One CSV row reduced to the plot schema
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRow {
    /// WGS84 longitude from `location_x`
    pub longitude: f64,
    /// WGS84 latitude from `location_y`
    pub latitude: f64,
    /// Raw text per [`PLOT_FIELDS`] entry
    values: Vec<String>,
}

impl PlotRow {
    /// Raw text of an output field
    pub fn get(&self, field: &str) -> Option<&str> {
        PLOT_FIELDS
            .iter()
            .position(|&(name, _)| name == field)
            .map(|i| self.values[i].as_str())
    }

    /// `(field, type, raw text)` in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldType, &str)> + '_ {
        PLOT_FIELDS
            .iter()
            .zip(&self.values)
            .map(|(&(name, field_type), value)| (name, field_type, value.as_str()))
    }
}

/// Reduce a CSV record to a [`PlotRow`].
///
/// A repeated column name keeps its first position and its last value.
/// Values beyond the 21st kept column are ignored.
pub fn remap_record(record: &CsvRecord) -> Result<PlotRow> {
    let mut kept: Vec<(&str, &str)> = Vec::with_capacity(record.len());
    for (name, value) in &record.columns {
        if is_dropped_column(name) {
            continue;
        }
        match kept.iter_mut().find(|(k, _)| *k == name.as_str()) {
            Some(slot) => slot.1 = value.as_str(),
            None => kept.push((name.as_str(), value.as_str())),
        }
    }

    let coordinate = |column: &str| -> Result<f64> {
        let raw = kept
            .iter()
            .find(|(k, _)| *k == column)
            .map(|(_, v)| *v)
            .ok_or_else(|| Error::MissingField(column.to_string()))?;
        raw.trim().parse::<f64>().map_err(|e| Error::InvalidValue {
            field: column.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    };
    let longitude = coordinate(LOCATION_X)?;
    let latitude = coordinate(LOCATION_Y)?;

    if kept.len() < PLOT_FIELDS.len() {
        return Err(Error::MissingField(format!(
            "{} (row has {} usable columns, {} needed)",
            PLOT_FIELDS[kept.len()].0,
            kept.len(),
            PLOT_FIELDS.len()
        )));
    }

    Ok(PlotRow {
        longitude,
        latitude,
        values: kept
            .into_iter()
            .take(PLOT_FIELDS.len())
            .map(|(_, v)| v.to_string())
            .collect(),
    })
}

/// Typed attribute for raw CSV text. `None` when the text does not parse
/// as the field type; empty numeric text is Null.
pub fn coerce(raw: &str, field_type: FieldType) -> Option<AttributeValue> {
    let text = raw.trim();
    match field_type {
        FieldType::String => Some(AttributeValue::String(raw.to_string())),
        _ if text.is_empty() => Some(AttributeValue::Null),
        FieldType::Int => text.parse().ok().map(AttributeValue::Int),
        FieldType::Double => text.parse().ok().map(AttributeValue::Float),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(columns: &[(&str, &str)]) -> CsvRecord {
        CsvRecord {
            columns: columns
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn dropped_columns() {
        for name in [
            "actively_saved",
            "subcategory",
            "landuse_subcategory",
            "deforestation_nature",
            "land_use2015",
            "confidence1990",
            "image_source2020",
            "land_use20152015",
            "confidence20002000_extra",
        ] {
            assert!(is_dropped_column(name), "{name} should be dropped");
        }
        for name in [
            "id",
            "location_x",
            "actively_saved_on_year",
            "land_use2015_sub",
            "land_use_2015",
            "image_source20155",
            "plot2015",
            "land_use2015x2015",
            "comments",
        ] {
            assert!(!is_dropped_column(name), "{name} should be kept");
        }
    }

    #[test]
    fn schema_has_21_fields() {
        let fields = plot_fields();
        assert_eq!(fields.len(), 21);
        assert_eq!(fields[0], Field::new("Plot_id", FieldType::Int));
        assert_eq!(fields[14], Field::new("sourceEnYr", FieldType::String));
        assert_eq!(fields[15], Field::new("dateEnYr", FieldType::Int));
        assert_eq!(fields[20].name, "comments");
    }

    #[test]
    fn remap_is_positional_after_dropping() {
        let mut columns: Vec<(String, String)> = vec![
            ("id".into(), "7".into()),
            ("actively_saved".into(), "true".into()),
            ("location_srs".into(), "EPSG:4326".into()),
            ("location_x".into(), "-3.7".into()),
            ("location_y".into(), "40.4".into()),
            ("land_use2015".into(), "Forest".into()),
        ];
        for i in 4..21 {
            columns.push((format!("col{}", i), format!("v{}", i)));
        }
        let row = remap_record(&CsvRecord { columns }).unwrap();

        assert_eq!(row.longitude, -3.7);
        assert_eq!(row.latitude, 40.4);
        assert_eq!(row.get("Plot_id"), Some("7"));
        assert_eq!(row.get("SRS"), Some("EPSG:4326"));
        assert_eq!(row.get("X"), Some("-3.7"));
        assert_eq!(row.get("operator"), Some("v4"));
        assert_eq!(row.get("comments"), Some("v20"));
        assert_eq!(row.iter().count(), 21);
    }

    #[test]
    fn location_is_required() {
        let no_y = record(&[("id", "1"), ("location_x", "1.0")]);
        assert!(matches!(remap_record(&no_y), Err(Error::MissingField(f)) if f == "location_y"));

        let bad_x = record(&[("location_x", "east"), ("location_y", "1.0")]);
        assert!(matches!(remap_record(&bad_x), Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn short_rows_fail() {
        let short = record(&[("id", "1"), ("location_x", "1.0"), ("location_y", "2.0")]);
        assert!(matches!(remap_record(&short), Err(Error::MissingField(_))));
    }

    #[test]
    fn coerce_values() {
        assert_eq!(coerce("2015", FieldType::Int), Some(AttributeValue::Int(2015)));
        assert_eq!(coerce(" 12 ", FieldType::Int), Some(AttributeValue::Int(12)));
        assert_eq!(coerce("", FieldType::Int), Some(AttributeValue::Null));
        assert_eq!(coerce("2015-06", FieldType::Int), None);
        assert_eq!(coerce("1.5", FieldType::Double), Some(AttributeValue::Float(1.5)));
        assert_eq!(
            coerce("", FieldType::String),
            Some(AttributeValue::String(String::new()))
        );
    }
}

//! GeoJSON vector layer reading/writing
//!
//! The layer CRS travels in the (pre-RFC 7946) `crs` member as an OGC URN,
//! the way GDAL writes projected GeoJSON.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection, Field, FieldType};
use geojson::{GeoJson, JsonObject, JsonValue};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a GeoJSON FeatureCollection from a file
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_geojson(&text)
}

/// Parse a GeoJSON FeatureCollection document.
///
/// The attribute schema is built from property names in first-seen order;
/// each field takes the type of its first non-null value.
pub fn parse_geojson(text: &str) -> Result<FeatureCollection> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(f) => geojson::FeatureCollection {
            bbox: None,
            features: vec![f],
            foreign_members: None,
        },
        GeoJson::Geometry(_) => {
            return Err(Error::UnsupportedGeometry(
                "expected a FeatureCollection, found a bare geometry".into(),
            ))
        }
    };

    let crs = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(crs_from_member);

    let mut layer = FeatureCollection::with_fields(Vec::new(), crs);

    for gj_feature in collection.features {
        let mut feature = match gj_feature.geometry {
            Some(geometry) => Feature::new(geo_types::Geometry::<f64>::try_from(geometry)?),
            None => Feature::empty(),
        };
        feature.id = gj_feature.id.map(|id| match id {
            geojson::feature::Id::String(s) => s,
            geojson::feature::Id::Number(n) => n.to_string(),
        });

        for (name, json) in gj_feature.properties.unwrap_or_default() {
            let value = attribute_from_json(json);
            match layer.fields.iter_mut().find(|f| f.name == name) {
                Some(field) => {
                    if field.field_type == FieldType::String
                        && !value.is_null()
                        && layer_column_is_null(&layer.features, &name)
                    {
                        field.field_type = FieldType::of(&value);
                    }
                }
                None => layer.fields.push(Field::new(name.clone(), FieldType::of(&value))),
            }
            feature.set_property(name, value);
        }

        layer.push(feature);
    }

    debug!(
        "Parsed GeoJSON layer: {} features, {} fields",
        layer.len(),
        layer.fields.len()
    );
    Ok(layer)
}

fn layer_column_is_null(features: &[Feature], name: &str) -> bool {
    features
        .iter()
        .all(|f| f.get_property(name).map_or(true, AttributeValue::is_null))
}

fn crs_from_member(member: &JsonValue) -> Option<CRS> {
    member
        .get("properties")?
        .get("name")?
        .as_str()?
        .parse()
        .ok()
}

fn attribute_from_json(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(b) => AttributeValue::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => n
                .as_f64()
                .map(AttributeValue::Float)
                .unwrap_or(AttributeValue::Null),
        },
        JsonValue::String(s) => AttributeValue::String(s),
        other => AttributeValue::String(other.to_string()),
    }
}

fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Bool(b) => JsonValue::Bool(*b),
        AttributeValue::Int(i) => JsonValue::from(*i),
        // NaN and infinities have no JSON encoding
        AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AttributeValue::String(s) => JsonValue::String(s.clone()),
    }
}

/// Serialize a layer as a GeoJSON FeatureCollection string
pub fn to_geojson_string(layer: &FeatureCollection) -> Result<String> {
    let features = layer
        .iter()
        .map(|feature| {
            let mut properties = JsonObject::new();
            for field in &layer.fields {
                let value = feature
                    .get_property(&field.name)
                    .map(attribute_to_json)
                    .unwrap_or(JsonValue::Null);
                properties.insert(field.name.clone(), value);
            }

            geojson::Feature {
                bbox: None,
                geometry: feature
                    .geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: feature.id.clone().map(geojson::feature::Id::String),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let foreign_members = layer.crs.as_ref().and_then(CRS::ogc_urn).map(|urn| {
        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            serde_json::json!({ "type": "name", "properties": { "name": urn } }),
        );
        members
    });

    let collection = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    };

    Ok(serde_json::to_string(&collection)?)
}

/// Write a layer to a GeoJSON file (overwrites)
pub fn write_geojson<P: AsRef<Path>>(layer: &FeatureCollection, path: P) -> Result<()> {
    let text = to_geojson_string(layer)?;
    fs::write(path.as_ref(), text)?;
    Ok(())
}

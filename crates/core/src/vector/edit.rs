//! Scoped edit sessions on a vector layer.
//!
//! An [`EditSession`] stages schema and attribute changes and applies them
//! all at once on [`EditSession::commit`]. Dropping the session without
//! committing (early return, `?`, panic) discards every staged change.

use super::{AttributeValue, FeatureCollection, Field};
use crate::error::{Error, Result};
use tracing::debug;

/// Guard over a layer in edit mode
#[derive(Debug)]
pub struct EditSession<'a> {
    layer: &'a mut FeatureCollection,
    new_fields: Vec<Field>,
    retyped: Vec<Field>,
    changes: Vec<(usize, String, AttributeValue)>,
    closed: bool,
}

impl<'a> EditSession<'a> {
    pub(super) fn new(layer: &'a mut FeatureCollection) -> Self {
        Self {
            layer,
            new_fields: Vec::new(),
            retyped: Vec::new(),
            changes: Vec::new(),
            closed: false,
        }
    }

    /// The layer as it was when the session opened
    pub fn layer(&self) -> &FeatureCollection {
        &*self.layer
    }

    /// Stage a new attribute column.
    ///
    /// Adding a field that already exists with the same type is a no-op, so
    /// re-running an algorithm overwrites its previous output column. An
    /// existing column of another type that holds no values is retyped.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        let staged = self
            .new_fields
            .iter()
            .chain(&self.retyped)
            .find(|f| f.name == field.name)
            .map(|f| f.field_type);
        let in_layer = self.layer.field(&field.name).map(|f| f.field_type);

        match staged.or(in_layer) {
            Some(t) if t == field.field_type => Ok(()),
            Some(t) if staged.is_none() && self.column_is_empty(&field.name) => {
                debug!(
                    "Retyping empty field {} from {:?} to {:?}",
                    field.name, t, field.field_type
                );
                self.retyped.push(field);
                Ok(())
            }
            Some(_) => Err(Error::FieldExists { name: field.name }),
            None => {
                self.new_fields.push(field);
                Ok(())
            }
        }
    }

    fn column_is_empty(&self, name: &str) -> bool {
        self.layer
            .iter()
            .all(|f| f.get_property(name).map_or(true, AttributeValue::is_null))
    }

    /// Stage an attribute change on the feature at `index`
    pub fn change_attribute_value(
        &mut self,
        index: usize,
        field: &str,
        value: AttributeValue,
    ) -> Result<()> {
        if index >= self.layer.len() {
            return Err(Error::Algorithm(format!(
                "feature index {} out of range for layer of {} features",
                index,
                self.layer.len()
            )));
        }
        let known = self.layer.field(field).is_some()
            || self.new_fields.iter().any(|f| f.name == field);
        if !known {
            return Err(Error::MissingField(field.to_string()));
        }

        self.changes.push((index, field.to_string(), value));
        Ok(())
    }

    /// Number of staged attribute changes
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    /// Apply all staged changes to the layer
    pub fn commit(mut self) -> usize {
        let fields = std::mem::take(&mut self.new_fields);
        let retyped = std::mem::take(&mut self.retyped);
        let changes = std::mem::take(&mut self.changes);
        let applied = changes.len();

        for field in retyped {
            if let Some(slot) = self.layer.fields.iter_mut().find(|f| f.name == field.name) {
                slot.field_type = field.field_type;
            }
        }
        self.layer.fields.extend(fields);
        for (index, field, value) in changes {
            self.layer.features[index].set_property(field, value);
        }

        self.closed = true;
        debug!("Committed {} attribute changes", applied);
        applied
    }

    /// Discard all staged changes
    pub fn rollback(mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        if !self.closed {
            let staged = self.new_fields.len() + self.retyped.len();
            if !self.changes.is_empty() || staged > 0 {
                debug!(
                    "Discarding {} attribute changes and {} new or retyped fields",
                    self.changes.len(),
                    staged
                );
            }
            self.changes.clear();
            self.new_fields.clear();
            self.retyped.clear();
            self.closed = true;
        }
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        self.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{Feature, FieldType};
    use geo_types::Point;

    fn layer() -> FeatureCollection {
        let mut layer =
            FeatureCollection::with_fields(vec![Field::new("label", FieldType::String)], None);
        for label in ["forest", "non-forest"] {
            let mut f = Feature::new(Point::new(0.0, 0.0).into());
            f.set_property("label", AttributeValue::String(label.into()));
            layer.push(f);
        }
        layer
    }

    #[test]
    fn commit_applies_fields_and_values() {
        let mut layer = layer();
        let mut session = layer.start_editing();
        session.add_field(Field::new("NDVI_MEAN", FieldType::Double)).unwrap();
        session
            .change_attribute_value(1, "NDVI_MEAN", AttributeValue::Float(0.4))
            .unwrap();
        assert_eq!(session.commit(), 1);

        assert!(layer.field("NDVI_MEAN").is_some());
        assert_eq!(
            layer.features[1].get_property("NDVI_MEAN"),
            Some(&AttributeValue::Float(0.4))
        );
        assert!(layer.features[0].get_property("NDVI_MEAN").is_none());
    }

    #[test]
    fn drop_discards_everything() {
        let mut layer = layer();
        {
            let mut session = layer.start_editing();
            session.add_field(Field::new("NDVI_MEAN", FieldType::Double)).unwrap();
            session
                .change_attribute_value(0, "NDVI_MEAN", AttributeValue::Float(0.1))
                .unwrap();
        }
        assert!(layer.field("NDVI_MEAN").is_none());
        assert!(layer.features[0].get_property("NDVI_MEAN").is_none());
    }

    #[test]
    fn early_return_leaves_layer_untouched() {
        fn failing_edit(layer: &mut FeatureCollection) -> Result<()> {
            let mut session = layer.start_editing();
            session.add_field(Field::new("X_MEAN", FieldType::Double))?;
            session.change_attribute_value(0, "X_MEAN", AttributeValue::Float(1.0))?;
            session.change_attribute_value(7, "X_MEAN", AttributeValue::Float(1.0))?;
            session.commit();
            Ok(())
        }

        let mut layer = layer();
        assert!(failing_edit(&mut layer).is_err());
        assert_eq!(layer.fields.len(), 1);
        assert!(layer.features[0].get_property("X_MEAN").is_none());
    }

    #[test]
    fn add_field_is_idempotent_for_same_type() {
        let mut layer = layer();
        let mut session = layer.start_editing();
        session.add_field(Field::new("label", FieldType::String)).unwrap();
        assert!(matches!(
            session.add_field(Field::new("label", FieldType::Double)),
            Err(Error::FieldExists { .. })
        ));
        session.rollback();
        assert_eq!(layer.fields.len(), 1);
    }

    #[test]
    fn empty_column_is_retyped_on_commit() {
        let mut layer = layer();
        layer.fields.push(Field::new("NDVI_MEAN", FieldType::String));
        layer.features[0].set_property("NDVI_MEAN", AttributeValue::Null);

        {
            let mut session = layer.start_editing();
            session.add_field(Field::new("NDVI_MEAN", FieldType::Double)).unwrap();
        }
        assert_eq!(layer.field("NDVI_MEAN").map(|f| f.field_type), Some(FieldType::String));

        let mut session = layer.start_editing();
        session.add_field(Field::new("NDVI_MEAN", FieldType::Double)).unwrap();
        session.add_field(Field::new("NDVI_MEAN", FieldType::Double)).unwrap();
        session
            .change_attribute_value(1, "NDVI_MEAN", AttributeValue::Float(0.3))
            .unwrap();
        session.commit();

        assert_eq!(layer.fields.len(), 2);
        assert_eq!(layer.field("NDVI_MEAN").map(|f| f.field_type), Some(FieldType::Double));
        assert_eq!(
            layer.features[1].get_property("NDVI_MEAN"),
            Some(&AttributeValue::Float(0.3))
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let mut layer = layer();
        let mut session = layer.start_editing();
        assert!(matches!(
            session.change_attribute_value(0, "nope", AttributeValue::Null),
            Err(Error::MissingField(_))
        ));
        assert_eq!(session.pending_changes(), 0);
    }
}

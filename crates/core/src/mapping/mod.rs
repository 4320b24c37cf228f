//! Declarative, typed, bidirectional field mapping
//!
//! Each entity type carries a fixed table from local semantic field name to
//! its EXT counterpart and conversion rule. The table drives both
//! directions: reversing it is lossless for every non-unresolved field.

pub mod conversions;
mod tables;

use std::collections::HashMap;

use serde_json::Value;

use crate::ports::FieldData;
pub use tables::{
    buyer_field_map, communication_field_map, property_field_map, submission_field_map,
    PROGRAM_LABELS,
};

/// Conversion rule applied to a mapped field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Date,
    Boolean,
    Currency,
    Numeric,
    /// Checkbox value list (newline-delimited on the EXT side)
    Enumeration,
    Text,
}

/// One entry of a field map
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub local: &'static str,
    pub external: &'static str,
    pub class: TypeClass,
    /// EXT-side name not yet confirmed; never emitted on write
    pub unresolved: bool,
}

impl FieldSpec {
    pub const fn new(local: &'static str, external: &'static str, class: TypeClass) -> Self {
        Self { local, external, class, unresolved: false }
    }

    pub const fn unresolved(local: &'static str, external: &'static str, class: TypeClass) -> Self {
        Self { local, external, class, unresolved: true }
    }
}

/// A fixed field table for one entity type
#[derive(Debug)]
pub struct FieldMap {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Local buyer name parts feed the composed EXT name field
const FULL_NAME: &str = "full_name";

impl FieldMap {
    /// Translate a local object into an EXT payload.
    ///
    /// Unresolved entries are skipped, as are fields absent (or null) in
    /// the local object. The buyer `full_name` field composes from
    /// `first_name`/`last_name` parts when not set directly.
    pub fn to_external(&self, local: &FieldData) -> FieldData {
        let mut payload = FieldData::new();

        for spec in self.fields {
            if spec.unresolved {
                continue;
            }

            let composed;
            let value = if spec.local == FULL_NAME && !local.contains_key(FULL_NAME) {
                let first = local.get("first_name").and_then(Value::as_str).unwrap_or("");
                let last = local.get("last_name").and_then(Value::as_str).unwrap_or("");
                if first.is_empty() && last.is_empty() {
                    continue;
                }
                composed = Value::String(conversions::compose_name(first, last));
                &composed
            } else {
                match local.get(spec.local) {
                    Some(value) if !value.is_null() => value,
                    _ => continue,
                }
            };

            payload.insert(spec.external.to_string(), convert_to_external(spec.class, value));
        }

        payload
    }

    /// Translate EXT field data into a local object.
    ///
    /// External keys with no map entry are silently ignored so EXT schema
    /// growth never breaks reads.
    pub fn from_external(&self, ext: &FieldData) -> FieldData {
        let reverse: HashMap<&str, &FieldSpec> =
            self.fields.iter().map(|spec| (spec.external, spec)).collect();

        let mut local = FieldData::new();
        for (key, value) in ext {
            if let Some(spec) = reverse.get(key.as_str()) {
                local.insert(spec.local.to_string(), convert_from_external(spec.class, value));
            }
        }
        local
    }
}

fn convert_to_external(class: TypeClass, value: &Value) -> Value {
    match class {
        TypeClass::Date => conversions::date_to_external(value),
        TypeClass::Boolean => conversions::bool_to_external(value),
        TypeClass::Currency | TypeClass::Numeric => conversions::number_from_value(value),
        TypeClass::Enumeration => conversions::enumeration_to_external(value),
        TypeClass::Text => value.clone(),
    }
}

fn convert_from_external(class: TypeClass, value: &Value) -> Value {
    match class {
        TypeClass::Date => conversions::date_from_external(value),
        TypeClass::Boolean => conversions::bool_from_external(value),
        TypeClass::Currency | TypeClass::Numeric => conversions::number_from_value(value),
        TypeClass::Enumeration => conversions::enumeration_from_external(value, PROGRAM_LABELS),
        TypeClass::Text => value.clone(),
    }
}

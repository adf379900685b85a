//! JSON batch adapter
//!
//! Accepts either a bare array of directive records or an object holding
//! them under `directives`.

use crate::{decode_records, LoadError};
use nrt_core::Directive;
use serde_json::Value;

/// JSON batch adapter
pub struct JsonAdapter;

impl JsonAdapter {
    /// Parse a JSON batch
    pub fn parse(input: &str) -> Result<Vec<Directive>, LoadError> {
        let document: Value = serde_json::from_str(input)?;
        match &document {
            Value::Array(records) => decode_records(records),
            Value::Object(map) => match map.get("directives") {
                Some(Value::Array(records)) => decode_records(records),
                Some(_) => Err(LoadError::Shape("'directives' must be an array".to_string())),
                None => Err(LoadError::Shape("missing 'directives' array".to_string())),
            },
            _ => Err(LoadError::Shape(
                "expected an array of directives or an object with 'directives'".to_string(),
            )),
        }
    }
}

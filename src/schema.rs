//! Strict JSON schemas sent with each structured-output request.
//!
//! Schemas are derived from the record types with `schemars`, then rewritten
//! for strict mode: every object closed, every property required, and all
//! `$ref`s inlined.

use crate::models::appraisal::{Identification, ListingsPayload};
use crate::models::openai::{JsonSchemaSpec, ResponseFormat};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A record the model is asked to produce under a strict schema
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Schema name sent to the provider
    const NAME: &'static str;

    fn json_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = value.get("definitions").cloned().unwrap_or(Value::Null);
        inline_refs(&mut value, &definitions);
        close_objects(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }
        value
    }

    fn response_format() -> ResponseFormat {
        ResponseFormat::JsonSchema(JsonSchemaSpec {
            name: Self::NAME.to_string(),
            strict: true,
            schema: <Self as StructuredOutput>::json_schema(),
        })
    }
}

impl StructuredOutput for Identification {
    const NAME: &'static str = "luxury_identification";
}

impl StructuredOutput for ListingsPayload {
    const NAME: &'static str = "similar_listings";
}

/// Replace `{"$ref": "#/definitions/X"}` with the definition of `X`
fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|path| path.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(def) = target {
                *value = def;
                inline_refs(value, definitions);
                return;
            }

            for child in map.values_mut() {
                inline_refs(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

/// Close every object schema and require all of its properties.
/// Numeric `format` hints (`double`, `uint`) are not accepted in strict mode.
fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                if let Some(Value::Object(props)) = map.get("properties") {
                    let required = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".to_string(), Value::Array(required));
                }
            }
            if matches!(
                map.get("type").and_then(Value::as_str),
                Some("number") | Some("integer")
            ) {
                map.remove("format");
            }

            for child in map.values_mut() {
                close_objects(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                close_objects(item);
            }
        }
        _ => {}
    }
}

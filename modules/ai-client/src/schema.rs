use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Trait for types that can be used as Gemini structured output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate a Gemini-compatible function-parameter schema for this type.
    ///
    /// Gemini function declarations accept an OpenAPI schema subset:
    /// 1. No `$ref` references; schemas must be fully inlined
    /// 2. No `additionalProperties` keyword
    /// 3. No free-form `format` values on strings
    fn gemini_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);
        strip_unsupported_keys(&mut value);

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn strip_unsupported_keys(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("additionalProperties");
            if let Some(serde_json::Value::String(format)) = map.get("format") {
                if format != "date-time" {
                    map.remove("format");
                }
            }

            for (_, v) in map.iter_mut() {
                strip_unsupported_keys(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                strip_unsupported_keys(item);
            }
        }
        _ => {}
    }
}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = if let serde_json::Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if ref_path.starts_with("#/definitions/") {
                    let type_name = ref_path.trim_start_matches("#/definitions/");
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct TestVerdict {
        status: String,
        summary: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct TestResponse {
        verdicts: Vec<TestVerdict>,
    }

    #[test]
    fn test_gemini_schema_generation() {
        let schema = TestResponse::gemini_schema();
        assert!(schema.is_object());
        assert_eq!(
            schema.get("type"),
            Some(&serde_json::Value::String("object".to_string()))
        );
    }

    #[test]
    fn test_no_additional_properties() {
        let schema = TestResponse::gemini_schema();
        let schema_str = serde_json::to_string(&schema).unwrap();
        assert!(!schema_str.contains("additionalProperties"));
    }

    #[test]
    fn test_nested_struct_inlined() {
        let schema = TestResponse::gemini_schema();
        let schema_obj = schema.as_object().unwrap();

        assert!(!schema_obj.contains_key("definitions"));
        assert!(!schema_obj.contains_key("$schema"));

        let properties = schema_obj.get("properties").unwrap().as_object().unwrap();
        let verdicts = properties.get("verdicts").unwrap().as_object().unwrap();
        let items = verdicts.get("items").unwrap().as_object().unwrap();

        assert!(!items.contains_key("$ref"));
        assert_eq!(
            items.get("type"),
            Some(&serde_json::Value::String("object".to_string()))
        );
    }

    #[test]
    fn test_enum_variants_survive() {
        #[derive(Deserialize, JsonSchema)]
        enum Verdict {
            #[serde(rename = "Verified Claim")]
            Verified,
            #[serde(rename = "Debunked Myth")]
            Debunked,
        }

        #[derive(Deserialize, JsonSchema)]
        struct Wrapper {
            #[allow(dead_code)]
            verdict: Verdict,
        }

        let schema = Wrapper::gemini_schema();
        let schema_str = serde_json::to_string(&schema).unwrap();
        assert!(schema_str.contains("Verified Claim"));
        assert!(schema_str.contains("Debunked Myth"));
    }
}

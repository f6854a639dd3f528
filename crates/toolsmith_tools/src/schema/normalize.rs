//! Narrowing baseline schemas to tool argument schemas.

use serde_json::Value;

/// Keys that play no part in validating tool arguments.
const UNWANTED_KEYS: &[&str] = &[
    "$id",
    "$schema",
    "$ref",
    "$comment",
    "$anchor",
    "$defs",
    "definitions",
    "title",
    "examples",
    "example",
    "default",
    "deprecated",
    "readOnly",
    "writeOnly",
    "nullable",
    "discriminator",
    "xml",
    "externalDocs",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "contains",
    "minContains",
    "maxContains",
    "prefixItems",
    "unevaluatedItems",
    "minProperties",
    "maxProperties",
    "additionalProperties",
    "patternProperties",
    "propertyNames",
    "unevaluatedProperties",
    "dependentRequired",
    "dependentSchemas",
    "if",
    "then",
    "else",
    "const",
    "contentEncoding",
    "contentMediaType",
    "contentSchema",
];

const COMBINATORS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// Normalizes a baseline schema into a tool argument schema.
///
/// This function:
/// - Removes `type` from schemas carrying `allOf`, `anyOf` or `oneOf`.
/// - Turns `{"type": "string", "format": "byte"}` into `{"type": "number"}`.
/// - Removes titles, examples, bounds, `$`-keywords, read/write flags,
///   conditional keywords and `x-` extension fields.
/// - Recurses into `properties`, `items`, `not` and combinator children.
///
/// Key order of what remains is preserved.
pub fn normalize_tool_schema(mut schema: Value) -> Value {
    if let Value::Object(ref mut obj) = schema {
        if let Some(Value::Object(props)) = obj.get_mut("properties") {
            for (_key, value) in props.iter_mut() {
                *value = normalize_tool_schema(value.take());
            }
        }

        if let Some(items) = obj.get_mut("items") {
            *items = normalize_tool_schema(items.take());
        }

        if let Some(not) = obj.get_mut("not") {
            *not = normalize_tool_schema(not.take());
        }

        let mut has_combinator = false;
        for key in COMBINATORS {
            if let Some(Value::Array(arr)) = obj.get_mut(*key) {
                has_combinator = true;
                for item in arr.iter_mut() {
                    *item = normalize_tool_schema(item.take());
                }
            }
        }

        let is_byte = obj.get("type").and_then(Value::as_str) == Some("string")
            && obj.get("format").and_then(Value::as_str) == Some("byte");
        if is_byte && let Some(ty) = obj.get_mut("type") {
            *ty = Value::String("number".to_string());
        }

        obj.retain(|key, _| {
            let unwanted = UNWANTED_KEYS.contains(&key.as_str())
                || key.starts_with("x-")
                || (has_combinator && key == "type")
                || (is_byte && key == "format");
            if unwanted {
                tracing::trace!(property = %key, "removed schema property");
            }
            !unwanted
        });
    }

    schema
}

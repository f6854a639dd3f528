//! Baseline type to schema mapping.
//!
//! [`TypeMapper`] converts a type into an OpenAPI-flavored schema: numeric
//! formats, `title`s on named types, `additionalProperties`, `prefixItems` and
//! item bounds are all emitted. [`normalize_tool_schema`](super::normalize_tool_schema)
//! narrows the result to what tool arguments are validated against.

use crate::error::SchemaError;
use schemars::{Schema, json_schema};
use serde_json::{Map, Value};
use toolsmith_syntax::{TypeArena, TypeId, TypeKind};

/// Maps types to baseline schemas.
///
/// Named types are inlined. A named type reached again while it is being
/// mapped unfolds once: the inner occurrence maps to the empty schema `{}`.
#[derive(Debug)]
pub struct TypeMapper<'a> {
    types: &'a TypeArena,
    in_progress: Vec<TypeId>,
}

impl<'a> TypeMapper<'a> {
    /// Creates a mapper over `types`.
    #[must_use]
    pub fn new(types: &'a TypeArena) -> Self {
        Self {
            types,
            in_progress: Vec::new(),
        }
    }

    /// Maps `ty` to its baseline schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedType`] for types with no data
    /// representation (`any`, `error`, objects, functions, handles and
    /// unresolved names).
    pub fn map(&mut self, ty: TypeId) -> Result<Schema, SchemaError> {
        let types = self.types;
        let schema = match types.get(ty) {
            TypeKind::Nil => json_schema!({ "type": "null" }),
            TypeKind::Boolean => json_schema!({ "type": "boolean" }),
            TypeKind::Int => json_schema!({ "type": "integer", "format": "int64" }),
            TypeKind::Byte => json_schema!({ "type": "string", "format": "byte" }),
            TypeKind::Float => json_schema!({ "type": "number", "format": "float" }),
            TypeKind::Decimal => json_schema!({ "type": "number", "format": "double" }),
            TypeKind::String | TypeKind::Xml => json_schema!({ "type": "string" }),
            TypeKind::Json | TypeKind::Anydata => json_schema!({}),
            TypeKind::Singleton(value) => json_schema!({
                "type": json_type(value),
                "enum": [value],
            }),
            TypeKind::Union(members) => self.map_union(members)?,
            TypeKind::Record { fields, rest } => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for (name, field) in fields {
                    properties.insert(name.clone(), self.map(field.ty)?.into());
                    if !field.optional && !field.has_default {
                        required.push(Value::String(name.clone()));
                    }
                }
                let additional = match rest {
                    Some(rest) => self.map(*rest)?.into(),
                    None => Value::Bool(false),
                };

                let mut object = Map::new();
                object.insert("type".to_string(), "object".into());
                if !required.is_empty() {
                    object.insert("required".to_string(), Value::Array(required));
                }
                object.insert("properties".to_string(), Value::Object(properties));
                object.insert("additionalProperties".to_string(), additional);
                Schema::from(object)
            }
            TypeKind::Map(value) => {
                let value = self.map(*value)?;
                json_schema!({ "type": "object", "additionalProperties": value })
            }
            TypeKind::Array { element, length } => {
                let items = self.map(*element)?;
                let mut schema = json_schema!({ "type": "array", "items": items });
                if let Some(length) = length {
                    schema.insert("minItems".to_string(), (*length).into());
                    schema.insert("maxItems".to_string(), (*length).into());
                }
                schema
            }
            TypeKind::Tuple(members) => {
                let prefix = members
                    .iter()
                    .map(|member| self.map(*member).map(Value::from))
                    .collect::<Result<Vec<_>, _>>()?;
                json_schema!({
                    "type": "array",
                    "prefixItems": prefix,
                    "minItems": members.len(),
                    "maxItems": members.len(),
                })
            }
            TypeKind::Table(row) => {
                let row = self.map(*row)?;
                json_schema!({ "type": "array", "items": row })
            }
            TypeKind::Reference(reference) => {
                if self.in_progress.contains(&ty) {
                    return Ok(json_schema!({}));
                }
                self.in_progress.push(ty);
                let target = self.map(reference.target);
                self.in_progress.pop();
                let mut schema = target?;
                schema.insert("title".to_string(), reference.name.clone().into());
                schema
            }
            TypeKind::Any
            | TypeKind::Error
            | TypeKind::Object { .. }
            | TypeKind::Function
            | TypeKind::Handle
            | TypeKind::Unresolved(_) => {
                return Err(SchemaError::unsupported_type(types.display_name(ty)));
            }
        };
        Ok(schema)
    }

    fn map_union(&mut self, members: &[TypeId]) -> Result<Schema, SchemaError> {
        let types = self.types;
        let singletons: Option<Vec<&Value>> = members
            .iter()
            .map(|member| match types.get(types.resolve_references(*member)) {
                TypeKind::Singleton(value) => Some(value),
                _ => None,
            })
            .collect();

        if let Some(values) = singletons.filter(|values| !values.is_empty()) {
            let mut schema = json_schema!({ "enum": values });
            let first = json_type(values[0]);
            if values.iter().all(|value| json_type(value) == first) {
                schema.insert("type".to_string(), first.into());
            }
            return Ok(schema);
        }

        let one_of = members
            .iter()
            .map(|member| self.map(*member).map(Value::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(json_schema!({ "oneOf": one_of }))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolsmith_syntax::RecordField;

    fn map(types: &TypeArena, ty: TypeId) -> Value {
        TypeMapper::new(types).map(ty).unwrap().into()
    }

    #[test]
    fn primitives_carry_openapi_formats() {
        let mut types = TypeArena::new();
        let int = types.alloc(TypeKind::Int);
        let byte = types.alloc(TypeKind::Byte);
        let decimal = types.alloc(TypeKind::Decimal);

        assert_eq!(map(&types, int), json!({"type": "integer", "format": "int64"}));
        assert_eq!(map(&types, byte), json!({"type": "string", "format": "byte"}));
        assert_eq!(map(&types, decimal), json!({"type": "number", "format": "double"}));
    }

    #[test]
    fn closed_record_lists_required_fields() {
        let mut types = TypeArena::new();
        let string = types.alloc(TypeKind::String);
        let int = types.alloc(TypeKind::Int);
        let mut fields = indexmap::IndexMap::new();
        fields.insert(
            "name".to_string(),
            RecordField {
                ty: string,
                optional: false,
                has_default: false,
            },
        );
        fields.insert(
            "age".to_string(),
            RecordField {
                ty: int,
                optional: true,
                has_default: false,
            },
        );
        let record = types.alloc(TypeKind::Record { fields, rest: None });

        let schema = map(&types, record);
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["properties"]["name"], json!({"type": "string"}));
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn string_enum_union() {
        let mut types = TypeArena::new();
        let fast = types.alloc(TypeKind::Singleton(json!("fast")));
        let slow = types.alloc(TypeKind::Singleton(json!("slow")));
        let union = types.alloc(TypeKind::Union(vec![fast, slow]));

        assert_eq!(
            map(&types, union),
            json!({"enum": ["fast", "slow"], "type": "string"})
        );
    }

    #[test]
    fn optional_type_becomes_one_of() {
        let mut types = TypeArena::new();
        let string = types.alloc(TypeKind::String);
        let nil = types.alloc(TypeKind::Nil);
        let union = types.alloc(TypeKind::Union(vec![string, nil]));

        assert_eq!(
            map(&types, union),
            json!({"oneOf": [{"type": "string"}, {"type": "null"}]})
        );
    }

    #[test]
    fn named_types_get_a_title() {
        let mut types = TypeArena::new();
        let string = types.alloc(TypeKind::String);
        let name = types.declare("Name", None);
        types.resolve(name, string);

        assert_eq!(map(&types, name), json!({"type": "string", "title": "Name"}));
    }

    #[test]
    fn recursive_type_unfolds_once() {
        let mut types = TypeArena::new();
        let node = types.declare("Node", None);
        let nil = types.alloc(TypeKind::Nil);
        let next = types.alloc(TypeKind::Union(vec![node, nil]));
        let mut fields = indexmap::IndexMap::new();
        fields.insert(
            "next".to_string(),
            RecordField {
                ty: next,
                optional: false,
                has_default: false,
            },
        );
        let record = types.alloc(TypeKind::Record { fields, rest: None });
        types.resolve(node, record);

        assert_eq!(
            map(&types, node),
            json!({
                "type": "object",
                "required": ["next"],
                "properties": {"next": {"oneOf": [{}, {"type": "null"}]}},
                "additionalProperties": false,
                "title": "Node",
            })
        );
    }

    #[test]
    fn repeated_named_type_is_not_a_cycle() {
        let mut types = TypeArena::new();
        let string = types.alloc(TypeKind::String);
        let name = types.declare("Name", None);
        types.resolve(name, string);
        let pair = types.alloc(TypeKind::Tuple(vec![name, name]));

        assert_eq!(
            map(&types, pair)["prefixItems"],
            json!([{"type": "string", "title": "Name"}, {"type": "string", "title": "Name"}])
        );
    }

    #[test]
    fn non_data_types_are_unsupported() {
        let mut types = TypeArena::new();
        let any = types.alloc(TypeKind::Any);
        let handle = types.alloc(TypeKind::Handle);

        assert!(matches!(
            TypeMapper::new(&types).map(any),
            Err(SchemaError::UnsupportedType(name)) if name == "any"
        ));
        assert!(TypeMapper::new(&types).map(handle).is_err());
    }
}

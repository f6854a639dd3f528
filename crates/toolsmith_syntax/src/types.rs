//! The closed type model supplied by the front end.
//!
//! Types live in a [`TypeArena`] and are addressed by [`TypeId`]. Named types
//! are [`TypeKind::Reference`] nodes whose target may point back at the
//! reference itself, so cyclic record definitions are representable without
//! any owning cycle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Handle to a type stored in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    /// Returns the raw index into the arena.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Organization and module name of the module that defines a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Organization name, e.g. `ballerina`.
    pub org: String,
    /// Dotted module name, e.g. `http` or `ai.agent`.
    pub name: String,
}

impl ModuleRef {
    /// Creates a module reference.
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
        }
    }
}

/// A field of a record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    /// Field type.
    pub ty: TypeId,
    /// Declared with `?`.
    pub optional: bool,
    /// Declared with a default value.
    pub has_default: bool,
}

/// A named type: a type alias or a type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReference {
    /// Declared name.
    pub name: String,
    /// Defining module, when the type comes from an imported module.
    pub module: Option<ModuleRef>,
    /// The referenced type descriptor.
    pub target: TypeId,
}

/// The shape of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    /// `()`
    Nil,
    /// `boolean`
    Boolean,
    /// `int`
    Int,
    /// `byte`
    Byte,
    /// `float`
    Float,
    /// `decimal`
    Decimal,
    /// `string`
    String,
    /// `xml`
    Xml,
    /// `json`
    Json,
    /// `anydata`
    Anydata,
    /// `any`
    Any,
    /// `error`
    Error,
    /// A singleton type holding exactly one literal value.
    Singleton(serde_json::Value),
    /// `A|B|...`
    Union(Vec<TypeId>),
    /// `record { ... }`; `rest` is `None` for closed records.
    Record {
        /// Fields in declaration order.
        fields: IndexMap<String, RecordField>,
        /// Rest field type of an open record.
        rest: Option<TypeId>,
    },
    /// `map<T>`
    Map(TypeId),
    /// `T[]` or `T[n]`
    Array {
        /// Element type.
        element: TypeId,
        /// Fixed length, if any.
        length: Option<usize>,
    },
    /// `[A, B, ...]`
    Tuple(Vec<TypeId>),
    /// `table<R>`
    Table(TypeId),
    /// A named type.
    Reference(TypeReference),
    /// An object or class type.
    Object {
        /// Class name, when known.
        name: Option<String>,
    },
    /// A function type.
    Function,
    /// `handle`
    Handle,
    /// A name the front end could not resolve.
    Unresolved(String),
}

/// Storage for all types of a package.
#[derive(Debug, Clone, Default)]
pub struct TypeArena {
    kinds: Vec<TypeKind>,
}

impl TypeArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type and returns its handle.
    pub fn alloc(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind);
        id
    }

    /// Returns the shape of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    #[must_use]
    pub fn get(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.index()]
    }

    /// Returns the number of types in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if the arena holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Declares a named type whose descriptor is not known yet.
    ///
    /// The returned reference targets an [`TypeKind::Unresolved`] placeholder
    /// until [`resolve`](Self::resolve) is called.
    pub fn declare(&mut self, name: impl Into<String>, module: Option<ModuleRef>) -> TypeId {
        let name = name.into();
        let placeholder = self.alloc(TypeKind::Unresolved(name.clone()));
        self.alloc(TypeKind::Reference(TypeReference {
            name,
            module,
            target: placeholder,
        }))
    }

    /// Points a declared reference at its descriptor.
    ///
    /// Does nothing when `reference` is not a [`TypeKind::Reference`].
    pub fn resolve(&mut self, reference: TypeId, target: TypeId) {
        if let TypeKind::Reference(type_ref) = &mut self.kinds[reference.index()] {
            type_ref.target = target;
        }
    }

    /// Follows references until a non-reference type is reached.
    ///
    /// Returns the last reference on a reference-only cycle.
    #[must_use]
    pub fn resolve_references(&self, mut id: TypeId) -> TypeId {
        let mut hops = 0;
        while let TypeKind::Reference(type_ref) = self.get(id) {
            if hops > self.kinds.len() {
                break;
            }
            id = type_ref.target;
            hops += 1;
        }
        id
    }

    /// Returns a short human-readable name for `id`.
    #[must_use]
    pub fn display_name(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeKind::Nil => "()".to_string(),
            TypeKind::Boolean => "boolean".to_string(),
            TypeKind::Int => "int".to_string(),
            TypeKind::Byte => "byte".to_string(),
            TypeKind::Float => "float".to_string(),
            TypeKind::Decimal => "decimal".to_string(),
            TypeKind::String => "string".to_string(),
            TypeKind::Xml => "xml".to_string(),
            TypeKind::Json => "json".to_string(),
            TypeKind::Anydata => "anydata".to_string(),
            TypeKind::Any => "any".to_string(),
            TypeKind::Error => "error".to_string(),
            TypeKind::Singleton(value) => value.to_string(),
            TypeKind::Union(members) => members
                .iter()
                .map(|member| self.display_name(*member))
                .collect::<Vec<_>>()
                .join("|"),
            TypeKind::Record { .. } => "record".to_string(),
            TypeKind::Map(_) => "map".to_string(),
            TypeKind::Array { .. } => "array".to_string(),
            TypeKind::Tuple(_) => "tuple".to_string(),
            TypeKind::Table(_) => "table".to_string(),
            TypeKind::Reference(type_ref) => match &type_ref.module {
                Some(module) => format!("{}/{}:{}", module.org, module.name, type_ref.name),
                None => type_ref.name.clone(),
            },
            TypeKind::Object { name } => name.clone().unwrap_or_else(|| "object".to_string()),
            TypeKind::Function => "function".to_string(),
            TypeKind::Handle => "handle".to_string(),
            TypeKind::Unresolved(name) => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_reference_can_point_at_itself() {
        let mut arena = TypeArena::new();
        let node = arena.declare("Node", None);
        let nil = arena.alloc(TypeKind::Nil);
        let next = arena.alloc(TypeKind::Union(vec![node, nil]));
        let mut fields = IndexMap::new();
        fields.insert(
            "next".to_string(),
            RecordField {
                ty: next,
                optional: false,
                has_default: false,
            },
        );
        let body = arena.alloc(TypeKind::Record { fields, rest: None });
        arena.resolve(node, body);

        assert_eq!(arena.resolve_references(node), body);
        assert_eq!(arena.display_name(node), "Node");
        assert_eq!(arena.display_name(next), "Node|()");
    }

    #[test]
    fn reference_only_cycle_terminates() {
        let mut arena = TypeArena::new();
        let a = arena.declare("A", None);
        let b = arena.declare("B", None);
        arena.resolve(a, b);
        arena.resolve(b, a);
        let end = arena.resolve_references(a);
        assert!(matches!(arena.get(end), TypeKind::Reference(_)));
    }
}

//! Type queries supplied by the front end.
//!
//! Analysis code only talks to [`SemanticModel`]. [`StructuralSemantics`] is a
//! structural implementation over a [`TypeArena`], used by the outline front
//! end and in tests; a production host wraps its own type checker instead.

use crate::types::{TypeArena, TypeId, TypeKind};
use hashbrown::HashSet;

/// A fixed universe of types that subtype queries are asked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Universe {
    /// Plain structural data: primitives and containers of them.
    Anydata,
    /// Error values.
    Error,
    /// Text markup (`xml`).
    Xml,
}

/// Type information for one compilation.
pub trait SemanticModel: Send + Sync {
    /// Returns the arena holding every type of the compilation.
    fn types(&self) -> &TypeArena;

    /// Returns true if `ty` is a subtype of `universe`.
    fn is_subtype(&self, ty: TypeId, universe: Universe) -> bool;
}

/// Structural subtype checks over a [`TypeArena`].
///
/// Cycles are treated co-inductively: a type already under inspection is
/// assumed to satisfy the query.
#[derive(Debug, Clone, Copy)]
pub struct StructuralSemantics<'a> {
    types: &'a TypeArena,
}

impl<'a> StructuralSemantics<'a> {
    /// Creates a semantic model over `types`.
    #[must_use]
    pub fn new(types: &'a TypeArena) -> Self {
        Self { types }
    }

    fn check(&self, ty: TypeId, universe: Universe, visiting: &mut HashSet<TypeId>) -> bool {
        if !visiting.insert(ty) {
            return true;
        }
        let result = match universe {
            Universe::Anydata => self.is_anydata(ty, visiting),
            Universe::Error => self.is_only(ty, Universe::Error, visiting),
            Universe::Xml => self.is_only(ty, Universe::Xml, visiting),
        };
        visiting.remove(&ty);
        result
    }

    fn is_anydata(&self, ty: TypeId, visiting: &mut HashSet<TypeId>) -> bool {
        match self.types.get(ty) {
            TypeKind::Nil
            | TypeKind::Boolean
            | TypeKind::Int
            | TypeKind::Byte
            | TypeKind::Float
            | TypeKind::Decimal
            | TypeKind::String
            | TypeKind::Xml
            | TypeKind::Json
            | TypeKind::Anydata
            | TypeKind::Singleton(_) => true,
            TypeKind::Union(members) | TypeKind::Tuple(members) => members
                .iter()
                .all(|member| self.check(*member, Universe::Anydata, visiting)),
            TypeKind::Record { fields, rest } => {
                fields
                    .values()
                    .all(|field| self.check(field.ty, Universe::Anydata, visiting))
                    && rest.is_none_or(|rest| self.check(rest, Universe::Anydata, visiting))
            }
            TypeKind::Map(element)
            | TypeKind::Table(element)
            | TypeKind::Array { element, .. } => self.check(*element, Universe::Anydata, visiting),
            TypeKind::Reference(type_ref) => self.check(type_ref.target, Universe::Anydata, visiting),
            TypeKind::Any
            | TypeKind::Error
            | TypeKind::Object { .. }
            | TypeKind::Function
            | TypeKind::Handle
            | TypeKind::Unresolved(_) => false,
        }
    }

    /// Membership in a universe with a single leaf kind (`error` or `xml`).
    fn is_only(&self, ty: TypeId, universe: Universe, visiting: &mut HashSet<TypeId>) -> bool {
        match self.types.get(ty) {
            TypeKind::Error => universe == Universe::Error,
            TypeKind::Xml => universe == Universe::Xml,
            TypeKind::Union(members) => {
                !members.is_empty()
                    && members
                        .iter()
                        .all(|member| self.check(*member, universe, visiting))
            }
            TypeKind::Reference(type_ref) => self.check(type_ref.target, universe, visiting),
            _ => false,
        }
    }
}

impl SemanticModel for StructuralSemantics<'_> {
    fn types(&self) -> &TypeArena {
        self.types
    }

    fn is_subtype(&self, ty: TypeId, universe: Universe) -> bool {
        self.check(ty, universe, &mut HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordField;
    use indexmap::IndexMap;

    fn record(arena: &mut TypeArena, fields: &[(&str, TypeId)]) -> TypeId {
        let fields: IndexMap<_, _> = fields
            .iter()
            .map(|(name, ty)| {
                (
                    (*name).to_string(),
                    RecordField {
                        ty: *ty,
                        optional: false,
                        has_default: false,
                    },
                )
            })
            .collect();
        arena.alloc(TypeKind::Record { fields, rest: None })
    }

    #[test]
    fn containers_of_any_are_not_anydata() {
        let mut arena = TypeArena::new();
        let any = arena.alloc(TypeKind::Any);
        let string = arena.alloc(TypeKind::String);
        let map_any = arena.alloc(TypeKind::Map(any));
        let map_string = arena.alloc(TypeKind::Map(string));
        let semantics = StructuralSemantics::new(&arena);

        assert!(!semantics.is_subtype(any, Universe::Anydata));
        assert!(!semantics.is_subtype(map_any, Universe::Anydata));
        assert!(semantics.is_subtype(map_string, Universe::Anydata));
    }

    #[test]
    fn cyclic_record_is_anydata() {
        let mut arena = TypeArena::new();
        let node = arena.declare("Node", None);
        let nil = arena.alloc(TypeKind::Nil);
        let next = arena.alloc(TypeKind::Union(vec![node, nil]));
        let body = record(&mut arena, &[("next", next)]);
        arena.resolve(node, body);
        let semantics = StructuralSemantics::new(&arena);

        assert!(semantics.is_subtype(node, Universe::Anydata));
        assert!(!semantics.is_subtype(node, Universe::Xml));
    }

    #[test]
    fn error_universe_accepts_aliases_and_unions_of_errors() {
        let mut arena = TypeArena::new();
        let error = arena.alloc(TypeKind::Error);
        let alias = arena.declare("MyError", None);
        arena.resolve(alias, error);
        let union = arena.alloc(TypeKind::Union(vec![alias, error]));
        let string = arena.alloc(TypeKind::String);
        let mixed = arena.alloc(TypeKind::Union(vec![error, string]));
        let semantics = StructuralSemantics::new(&arena);

        assert!(semantics.is_subtype(union, Universe::Error));
        assert!(!semantics.is_subtype(mixed, Universe::Error));
        assert!(!semantics.is_subtype(error, Universe::Anydata));
    }
}

//! Finding `xml` inside parameter types.

use hashbrown::HashSet;
use toolsmith_syntax::{SemanticModel, TypeId, TypeKind, Universe};

/// Determines whether a type transitively contains `xml`.
///
/// Visits named types, union members, record fields, map values and array and
/// table elements. A type seen before answers "not reached", so recursive
/// types terminate; the fields of a recursive record are still visited on
/// their first encounter.
///
/// Create one checker per top-level inspection.
pub struct XmlReachabilityChecker<'a> {
    semantics: &'a dyn SemanticModel,
    visited: HashSet<TypeId>,
}

impl<'a> XmlReachabilityChecker<'a> {
    /// Creates a checker with an empty visited set.
    #[must_use]
    pub fn new(semantics: &'a dyn SemanticModel) -> Self {
        Self {
            semantics,
            visited: HashSet::new(),
        }
    }

    /// Returns true if `ty` reaches `xml`.
    pub fn includes_xml(&mut self, ty: TypeId) -> bool {
        if !self.visited.insert(ty) {
            return false;
        }
        let semantics = self.semantics;
        match semantics.types().get(ty) {
            TypeKind::Reference(reference) => self.includes_xml(reference.target),
            TypeKind::Union(members) => members.iter().any(|member| self.includes_xml(*member)),
            TypeKind::Record { fields, .. } => {
                fields.values().any(|field| self.includes_xml(field.ty))
            }
            TypeKind::Map(value) => self.includes_xml(*value),
            TypeKind::Array { element, .. } => self.includes_xml(*element),
            TypeKind::Table(row) => self.includes_xml(*row),
            _ => semantics.is_subtype(ty, Universe::Xml),
        }
    }
}

/// Returns true if `ty` reaches `xml`, using a fresh visited set.
#[must_use]
pub fn includes_xml(semantics: &dyn SemanticModel, ty: TypeId) -> bool {
    XmlReachabilityChecker::new(semantics).includes_xml(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolsmith_syntax::{Package, StructuralSemantics, TypeArena};

    fn param_types(source: &str) -> (Package, Vec<TypeId>) {
        let package = Package::from_source("main.bal", source).unwrap();
        let types = package.units()[0]
            .functions()
            .next()
            .unwrap()
            .params
            .iter()
            .map(|param| param.ty)
            .collect();
        (package, types)
    }

    #[test]
    fn direct_and_nested_xml() {
        let source = r#"
type Wrapped record { xml body; };

function f(xml one, xml[] two, Wrapped three, map<xml>? four, string five, table<record {| xml x; |}> six) {}
"#;
        let (package, params) = param_types(source);
        let semantics = package.semantics();
        let found: Vec<_> = params.iter().map(|ty| includes_xml(&semantics, *ty)).collect();
        assert_eq!(found, vec![true, true, true, true, false, true]);
    }

    #[test]
    fn recursive_record_terminates() {
        let source = r#"
type Tree record {|
    string label;
    Tree[] children;
|};

function f(Tree tree) {}
"#;
        let (package, params) = param_types(source);
        assert!(!includes_xml(&package.semantics(), params[0]));
    }

    #[test]
    fn revisit_answers_not_reached() {
        let mut types = TypeArena::new();
        let xml = types.alloc(TypeKind::Xml);
        let semantics = StructuralSemantics::new(&types);
        let mut checker = XmlReachabilityChecker::new(&semantics);

        assert!(checker.includes_xml(xml));
        assert!(!checker.includes_xml(xml));
        assert!(XmlReachabilityChecker::new(&semantics).includes_xml(xml));
    }
}

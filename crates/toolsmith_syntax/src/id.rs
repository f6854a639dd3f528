//! Identities for modules, documents and syntax nodes.
//!
//! All identities are plain copyable newtypes. Equality is by identity, never
//! by content: two textually identical annotations in different places carry
//! different [`NodeId`]s.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Identifies a logical module within a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    /// Creates a new module ID.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module_{}", self.0)
    }
}

/// Identifies a source unit (document) within a module.
///
/// Orders by module first, then by the document's position within the
/// module, which is the order agent declarations are collected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId {
    module: ModuleId,
    index: u32,
}

impl DocumentId {
    /// Creates a new document ID.
    #[must_use]
    pub fn new(module: ModuleId, index: u32) -> Self {
        Self { module, index }
    }

    /// Returns the module this document belongs to.
    #[must_use]
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// Returns the position of this document within its module.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/doc_{}", self.module, self.index)
    }
}

/// Identifies a syntax node within a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Creates a new node ID.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

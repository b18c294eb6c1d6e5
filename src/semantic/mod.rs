//! Semantic resolution: expression types and referenced symbols.
//!
//! The analysis never inspects type names as text. It asks a
//! [`SemanticModel`] for the [`TypeSymbol`] of an expression or the
//! [`Symbol`] an expression invokes, and compares fully-qualified names.
//!
//! ## Implementations
//!
//! - [`SourceModel`] - built from the declarations of every file in a
//!   compilation plus the configured catalog of external types
//! - test fixtures implement the trait directly with canned answers

mod catalog;
mod index;
mod model;
mod types;

pub use catalog::Catalog;
pub use model::SourceModel;
pub use types::{predefined, TypeRef};

use std::collections::BTreeSet;

use serde::Serialize;
use tree_sitter::Node;

use crate::syntax::{nav, SourceFile};

/// Resolver capability the analysis depends on.
///
/// Every query may return `None`; the caller treats that as "unknown" and
/// skips the node rather than guessing.
pub trait SemanticModel: Send + Sync {
    /// Type of the value an expression produces.
    fn type_of(&self, file: &SourceFile, node: Node<'_>) -> Option<TypeSymbol>;

    /// Method, constructor, field, property, local or parameter an
    /// expression refers to.
    fn symbol_of(&self, file: &SourceFile, node: Node<'_>) -> Option<Symbol>;

    /// Scope whose locals are visible at a node.
    fn enclosing_scope<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        nav::enclosing_scope(node)
    }
}

/// Kind of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    /// Referenced but never declared (unresolved generic argument, ...).
    Opaque,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSymbol {
    /// Fully-qualified name without generic arguments.
    pub full_name: String,
    pub type_arguments: Vec<TypeSymbol>,
    /// Fully-qualified names of every transitive base type and interface.
    pub supertypes: BTreeSet<String>,
    pub kind: TypeKind,
}

impl TypeSymbol {
    pub fn new(full_name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            full_name: full_name.into(),
            type_arguments: Vec::new(),
            supertypes: BTreeSet::new(),
            kind,
        }
    }

    /// A type known only by its written name.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Opaque)
    }

    pub fn with_supertypes<I, S>(mut self, supertypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes.extend(supertypes.into_iter().map(Into::into));
        self
    }

    pub fn with_type_arguments(mut self, arguments: Vec<TypeSymbol>) -> Self {
        self.type_arguments = arguments;
        self
    }

    /// True if this type is `full_name` or derives from / implements it.
    pub fn implements(&self, full_name: &str) -> bool {
        self.full_name == full_name || self.supertypes.contains(full_name)
    }

    /// Simple name: `MemoryStream` for `System.IO.MemoryStream`.
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map_or(self.full_name.as_str(), |(_, name)| name)
    }

    /// Lookup key distinguishing `Task` from `Task<T>`.
    pub fn key(&self) -> String {
        index::type_key(&self.full_name, self.type_arguments.len())
    }
}

impl std::fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name)?;
        if !self.type_arguments.is_empty() {
            let args: Vec<String> = self.type_arguments.iter().map(|t| t.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        Ok(())
    }
}

/// What a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Method,
    Constructor,
    Field,
    Property,
    Local,
    Parameter,
}

/// A resolved symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    /// Declaring type; `None` for locals, parameters and local functions.
    pub containing_type: Option<TypeSymbol>,
    /// Fully-qualified parameter types, `?` where unknown.
    pub parameters: Vec<String>,
    pub is_static: bool,
    /// Extension method called with reduced (receiver) syntax.
    pub is_extension: bool,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            containing_type: None,
            parameters: Vec::new(),
            is_static: false,
            is_extension: false,
        }
    }

    pub fn in_type(mut self, containing_type: TypeSymbol) -> Self {
        self.containing_type = Some(containing_type);
        self
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_member(&self) -> bool {
        matches!(self.kind, SymbolKind::Field | SymbolKind::Property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implements_self_and_supertypes() {
        let stream = TypeSymbol::new("System.IO.MemoryStream", TypeKind::Class)
            .with_supertypes(["System.IO.Stream", "System.IDisposable"]);
        assert!(stream.implements("System.IO.MemoryStream"));
        assert!(stream.implements("System.IDisposable"));
        assert!(!stream.implements("System.IAsyncDisposable"));
    }

    #[test]
    fn test_name_and_key() {
        let task = TypeSymbol::new("System.Threading.Tasks.Task", TypeKind::Class)
            .with_type_arguments(vec![TypeSymbol::opaque("System.IO.Stream")]);
        assert_eq!(task.name(), "Task");
        assert_eq!(task.key(), "System.Threading.Tasks.Task`1");
        assert_eq!(task.to_string(), "System.Threading.Tasks.Task<System.IO.Stream>");
    }
}

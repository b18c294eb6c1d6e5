//! C# syntax front end.
//!
//! Source files are parsed with tree-sitter's C# grammar. Everything above
//! this module works on [`tree_sitter::Node`] values plus the owning
//! [`SourceFile`] for text lookups.
//!
//! - [`kinds`] - grammar node kind names
//! - [`nav`] - named traversal combinators (enclosing declarator, argument
//!   list, scope, value wrappers, ...)
//! - [`Descendants`] - lazy pre-order traversal

pub mod kinds;
pub mod nav;
mod walk;

pub use walk::{ancestors, children, named_children, Descendants};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

use crate::util::offset_to_position;

/// Error when a source file cannot be turned into a syntax tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load the C# grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser produced no tree for {path}")]
    NoTree { path: PathBuf },
}

/// A parsed C# file.
pub struct SourceFile {
    path: PathBuf,
    text: String,
    tree: Tree,
}

impl SourceFile {
    /// Parse C# source text.
    ///
    /// Syntax errors do not fail the parse; tree-sitter recovers and the
    /// analysis simply sees fewer well-formed nodes.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let text = text.into();

        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into())?;
        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| ParseError::NoTree { path: path.clone() })?;

        if tree.root_node().has_error() {
            tracing::warn!("{} contains syntax errors", path.display());
        }

        Ok(Self { path, text, tree })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by a node.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        self.text.get(node.byte_range()).unwrap_or("")
    }

    /// Zero-based (line, column) of a byte offset, columns counted in chars.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let position = offset_to_position(&self.text, offset);
        (position.line, position.character)
    }

    /// The source line with the given zero-based index.
    pub fn line(&self, index: u32) -> Option<&str> {
        self.text.lines().nth(index as usize)
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("len", &self.text.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_class() {
        let file = SourceFile::parse("a.cs", "class A { void M() { var x = new B(); } }").unwrap();
        assert_eq!(file.root().kind(), kinds::COMPILATION_UNIT);
        let creations: Vec<_> =
            Descendants::of_kind(file.root(), kinds::OBJECT_CREATION_EXPRESSION).collect();
        assert_eq!(creations.len(), 1);
        assert_eq!(file.node_text(creations[0]), "new B()");
    }

    #[test]
    fn test_line_col() {
        let file = SourceFile::parse("a.cs", "class A {\n  int x;\n}").unwrap();
        assert_eq!(file.line_col(0), (0, 0));
        assert_eq!(file.line_col(12), (1, 2));
        assert_eq!(file.line(1), Some("  int x;"));
    }
}

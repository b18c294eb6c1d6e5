//! Scope resolvers: the lexical region a resource lives in and the nodes
//! the analysis searches inside it.

use tree_sitter::Node;

use super::context::Cx;
use crate::syntax::kinds::*;
use crate::syntax::{named_children, nav, Descendants, SourceFile};

/// A constructor, method, local function, lambda, anonymous method,
/// property, indexer or the compilation unit of top-level statements.
#[derive(Debug, Clone, Copy)]
pub struct ScopeView<'t> {
    root: Node<'t>,
}

impl<'t> ScopeView<'t> {
    pub fn new(root: Node<'t>) -> Self {
        Self { root }
    }

    /// The scope whose locals are visible at `node`.
    pub fn enclosing(cx: &Cx<'_>, node: Node<'t>) -> Option<Self> {
        cx.model.enclosing_scope(node).map(Self::new)
    }

    pub fn invocations(&self) -> impl Iterator<Item = Node<'t>> {
        Descendants::of_kind(self.root, INVOCATION_EXPRESSION)
    }

    pub fn creations(&self) -> impl Iterator<Item = Node<'t>> {
        Descendants::new(self.root).filter(|node| is_construction(node.kind()))
    }

    /// `using (...)` statements and `using var` declarations.
    pub fn using_statements(&self) -> impl Iterator<Item = Node<'t>> {
        Descendants::new(self.root).filter(|node| {
            node.kind() == USING_STATEMENT || nav::is_using_declaration(*node)
        })
    }

    pub fn returns(&self) -> impl Iterator<Item = Node<'t>> {
        Descendants::of_kind(self.root, RETURN_STATEMENT)
    }

    /// Identifiers spelling `name` inside `using` headers, excluding the
    /// names the headers declare.
    pub fn references_in_using_headers<'s>(
        &self,
        file: &'s SourceFile,
        name: &'s str,
    ) -> impl Iterator<Item = Node<'t>> + 's
    where
        't: 's,
    {
        self.using_statements()
            .flat_map(nav::using_header)
            .flat_map(Descendants::new)
            .filter(move |node| node.kind() == IDENTIFIER && file.node_text(*node) == name)
            .filter(|node| !is_declared_name(*node))
    }

    /// A `return` after `offset` hands back the local `name`, directly or
    /// as an argument of the returned call or construction.
    pub fn returns_after(&self, file: &SourceFile, name: &str, offset: usize) -> bool {
        self.returns()
            .filter(|ret| ret.start_byte() >= offset)
            .filter_map(nav::operand)
            .any(|value| hands_back(file, value, name))
    }
}

fn hands_back(file: &SourceFile, value: Node<'_>, name: &str) -> bool {
    let value = nav::unwrap_value(file, value);
    match value.kind() {
        IDENTIFIER => file.node_text(value) == name,
        INVOCATION_EXPRESSION | OBJECT_CREATION_EXPRESSION | IMPLICIT_OBJECT_CREATION_EXPRESSION => {
            nav::arguments(value)
                .into_iter()
                .filter_map(nav::argument_value)
                .any(|argument| hands_back(file, argument, name))
        }
        _ => false,
    }
}

fn is_declared_name(identifier: Node<'_>) -> bool {
    identifier.parent().is_some_and(|parent| {
        parent.kind() == VARIABLE_DECLARATOR
            && nav::declarator_name(parent).is_some_and(|n| nav::same(n, identifier))
    })
}

/// Methods of the type enclosing `node` where the type releases its members
/// (`Dispose`, `DisposeAsync`, or configured names).
pub fn release_designated_methods<'t>(cx: &Cx<'_>, node: Node<'t>) -> Vec<Node<'t>> {
    let Some(body) = nav::enclosing_type(node).and_then(nav::type_body) else {
        return Vec::new();
    };
    named_children(body)
        .into_iter()
        .filter(|member| member.kind() == METHOD_DECLARATION)
        .filter(|method| {
            nav::declaration_name(*method)
                .is_some_and(|name| cx.context.is_release_designated(cx.file.node_text(name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceFile {
        SourceFile::parse("scope.cs", source).unwrap()
    }

    fn method_scope(file: &SourceFile) -> ScopeView<'_> {
        ScopeView::new(Descendants::of_kind(file.root(), METHOD_DECLARATION).next().unwrap())
    }

    #[test]
    fn test_enumerations() {
        let file = parse(
            r#"
class A {
    object M() {
        var a = new X();
        using (var b = new Y(a)) { b.Run(); }
        using var c = Open();
        return a;
    }
}
"#,
        );
        let scope = method_scope(&file);
        assert_eq!(scope.creations().count(), 2);
        assert_eq!(scope.invocations().count(), 2);
        assert_eq!(scope.using_statements().count(), 2);
        assert_eq!(scope.returns().count(), 1);
    }

    #[test]
    fn test_header_references_skip_declared_names() {
        let file = parse("class A { void M() { using (var a = new Y(s)) { } using (s) { } } }");
        let scope = method_scope(&file);
        assert_eq!(scope.references_in_using_headers(&file, "s").count(), 2);
        assert_eq!(scope.references_in_using_headers(&file, "a").count(), 0);
    }

    #[test]
    fn test_returns_after() {
        let file = parse("class A { object M() { var s = new X(); return (object)s; } }");
        let scope = method_scope(&file);
        assert!(scope.returns_after(&file, "s", 0));
        assert!(!scope.returns_after(&file, "t", 0));
        assert!(!scope.returns_after(&file, "s", file.text().len()));
    }

    #[test]
    fn test_returns_after_through_arguments() {
        let file = parse(
            "class A { object M() { var s = new X(); var t = new X(); return Task.FromResult(new W((Stream)s)); } }",
        );
        let scope = method_scope(&file);
        assert!(scope.returns_after(&file, "s", 0));
        assert!(!scope.returns_after(&file, "t", 0));
    }
}

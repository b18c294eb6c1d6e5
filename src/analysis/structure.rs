//! Syntax context classifier.
//!
//! Every resource-creating expression lives in exactly one
//! [`StructuralContext`]. Predicates run in a fixed order and the first
//! match wins, so later arms may assume the earlier shapes were ruled out.

use tree_sitter::Node;

use super::context::Cx;
use super::scope::ScopeView;
use crate::semantic::SymbolKind;
use crate::syntax::kinds::*;
use crate::syntax::{ancestors, nav, SourceFile};

/// Where a resource-creating value ends up.
#[derive(Debug, Clone, Copy)]
pub enum StructuralContext<'t> {
    /// An invocation consumed by `await`; re-classified on the await.
    AwaitedResult { await_expression: Node<'t> },
    /// Receiver of a release call: `new X().Dispose()`.
    ReleasedImmediately,
    /// Returned from a property getter block.
    PropertyReturn { property: Node<'t> },
    /// `=> value` body of a property or its getter.
    PropertyExpressionBody { property: Node<'t> },
    ReturnInBlock,
    ReturnArrowBody,
    ReturnInLambda,
    /// Stored in a local that a later `return` hands back.
    ReturnLaterInMethod,
    ArgumentOfInvocation { invocation: Node<'t> },
    /// Receiver of a further call: `new X().Track(bag)`.
    MethodChainLink { invocation: Node<'t> },
    ArgumentOfConstruction { creation: Node<'t> },
    /// Element of an array initializer, with the construction receiving the
    /// array when there is one.
    ArrayInitializerElement { owner: Option<Node<'t>> },
    CollectionInitializerElement { creation: Node<'t> },
    UsingHeader,
    LocalDeclaration { name: Node<'t> },
    FieldDeclaration { name: Node<'t> },
    LocalAssignment { name: Node<'t> },
    FieldAssignment { name: Node<'t> },
    PropertyAssignment { name: Node<'t> },
    /// Stored into a member of some other object.
    MemberAssignment,
    /// Initializer of an auto-property.
    AutoProperty { property: Node<'t> },
    Anonymous,
}

impl StructuralContext<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            StructuralContext::AwaitedResult { .. } => "awaited result",
            StructuralContext::ReleasedImmediately => "released immediately",
            StructuralContext::PropertyReturn { .. } => "property return",
            StructuralContext::PropertyExpressionBody { .. } => "property expression body",
            StructuralContext::ReturnInBlock => "return in block",
            StructuralContext::ReturnArrowBody => "return arrow body",
            StructuralContext::ReturnInLambda => "return in lambda",
            StructuralContext::ReturnLaterInMethod => "returned later",
            StructuralContext::ArgumentOfInvocation { .. } => "argument of invocation",
            StructuralContext::MethodChainLink { .. } => "method chain link",
            StructuralContext::ArgumentOfConstruction { .. } => "argument of construction",
            StructuralContext::ArrayInitializerElement { .. } => "array initializer element",
            StructuralContext::CollectionInitializerElement { .. } => "collection initializer element",
            StructuralContext::UsingHeader => "using header",
            StructuralContext::LocalDeclaration { .. } => "local declaration",
            StructuralContext::FieldDeclaration { .. } => "field declaration",
            StructuralContext::LocalAssignment { .. } => "local assignment",
            StructuralContext::FieldAssignment { .. } => "field assignment",
            StructuralContext::PropertyAssignment { .. } => "property assignment",
            StructuralContext::MemberAssignment => "member assignment",
            StructuralContext::AutoProperty { .. } => "auto property",
            StructuralContext::Anonymous => "anonymous",
        }
    }
}

/// Classify a resource-creating expression.
pub fn classify<'t>(cx: &Cx<'_>, node: Node<'t>) -> StructuralContext<'t> {
    if node.kind() == INVOCATION_EXPRESSION {
        if let Some(await_expression) = nav::awaited_by(node) {
            return StructuralContext::AwaitedResult { await_expression };
        }
    }
    classify_value(cx, nav::value_root(cx.file, node))
}

/// Classify a value after climbing its transparent wrappers.
pub fn classify_value<'t>(cx: &Cx<'_>, root: Node<'t>) -> StructuralContext<'t> {
    let file = cx.file;

    let chained = nav::invocation_on_receiver(root);
    if let Some(invocation) = chained {
        if nav::invoked_name(file, invocation).is_some_and(|name| cx.context.is_release_method(name)) {
            return StructuralContext::ReleasedImmediately;
        }
    }

    if let Some(context) = returned(file, root) {
        return context;
    }
    if let Some(context) = returned_as_argument(file, root) {
        return context;
    }

    if let Some(owner) = nav::argument_owner(root) {
        return if owner.kind() == INVOCATION_EXPRESSION {
            StructuralContext::ArgumentOfInvocation { invocation: owner }
        } else {
            StructuralContext::ArgumentOfConstruction { creation: owner }
        };
    }
    if let Some(invocation) = chained {
        return StructuralContext::MethodChainLink { invocation };
    }
    if let Some(context) = initializer_element(cx, root) {
        return context;
    }

    if nav::enclosing_using_header(root).is_some() {
        return StructuralContext::UsingHeader;
    }

    if let Some(declarator) = nav::declarator_of(root) {
        if declarator.is_field() {
            return StructuralContext::FieldDeclaration {
                name: declarator.name,
            };
        }
        if returned_later(cx, root, file.node_text(declarator.name)) {
            return StructuralContext::ReturnLaterInMethod;
        }
        return StructuralContext::LocalDeclaration {
            name: declarator.name,
        };
    }

    if let Some(context) = assigned(cx, root) {
        return context;
    }

    if let Some(property) = property_initializer(root) {
        return StructuralContext::AutoProperty { property };
    }

    StructuralContext::Anonymous
}

/// Return statements, arrow bodies and lambda bodies.
fn returned<'t>(file: &SourceFile, root: Node<'t>) -> Option<StructuralContext<'t>> {
    let parent = root.parent()?;

    if parent.kind() == RETURN_STATEMENT {
        let scope = nav::enclosing_scope(parent);
        return Some(match scope.map(|s| s.kind()) {
            Some(PROPERTY_DECLARATION) => {
                let in_getter = ancestors(parent)
                    .find(|a| a.kind() == ACCESSOR_DECLARATION)
                    .is_some_and(|accessor| nav::is_getter(file, accessor));
                match scope {
                    Some(property) if in_getter => StructuralContext::PropertyReturn { property },
                    _ => StructuralContext::ReturnInBlock,
                }
            }
            Some(kind) if is_anonymous_function(kind) => StructuralContext::ReturnInLambda,
            _ => StructuralContext::ReturnInBlock,
        });
    }

    if let Some(owner) = nav::arrow_body_owner(root) {
        return match owner.kind() {
            PROPERTY_DECLARATION => Some(StructuralContext::PropertyExpressionBody { property: owner }),
            ACCESSOR_DECLARATION => {
                let property = nav::accessor_property(owner)?;
                nav::is_getter(file, owner)
                    .then_some(StructuralContext::PropertyExpressionBody { property })
            }
            LAMBDA_EXPRESSION | ANONYMOUS_METHOD_EXPRESSION => Some(StructuralContext::ReturnInLambda),
            _ => Some(StructuralContext::ReturnArrowBody),
        };
    }

    if parent.kind() == LAMBDA_EXPRESSION {
        let is_body = parent
            .child_by_field_name("body")
            .is_some_and(|body| nav::same(body, root));
        if is_body {
            return Some(StructuralContext::ReturnInLambda);
        }
    }
    None
}

/// Argument, at any depth, of a call or construction that is itself
/// returned. Property getters are left to the argument handlers.
fn returned_as_argument<'t>(file: &SourceFile, root: Node<'t>) -> Option<StructuralContext<'t>> {
    let mut current = root;
    while let Some(owner) = nav::argument_owner(current) {
        current = nav::value_root(file, owner);
        if let Some(context) = returned(file, current) {
            return match context {
                StructuralContext::PropertyReturn { .. } | StructuralContext::PropertyExpressionBody { .. } => None,
                other => Some(other),
            };
        }
    }
    None
}

/// Element of `new[] { ... }` or of a collection initializer `new T { ... }`.
fn initializer_element<'t>(cx: &Cx<'_>, root: Node<'t>) -> Option<StructuralContext<'t>> {
    let mut initializer = root.parent().filter(|p| p.kind() == INITIALIZER_EXPRESSION)?;
    // Dictionary-style `{ { key, value } }` nests initializers
    while let Some(outer) = initializer.parent().filter(|p| p.kind() == INITIALIZER_EXPRESSION) {
        initializer = outer;
    }
    let holder = initializer.parent()?;
    match holder.kind() {
        ARRAY_CREATION_EXPRESSION | IMPLICIT_ARRAY_CREATION_EXPRESSION => {
            let array_root = nav::value_root(cx.file, holder);
            let owner = nav::argument_owner(array_root).filter(|o| is_construction(o.kind()));
            Some(StructuralContext::ArrayInitializerElement { owner })
        }
        kind if is_construction(kind) => {
            Some(StructuralContext::CollectionInitializerElement { creation: holder })
        }
        VARIABLE_DECLARATOR | EQUALS_VALUE_CLAUSE => {
            Some(StructuralContext::ArrayInitializerElement { owner: None })
        }
        _ => None,
    }
}

/// The local was declared in a scope that returns it later.
fn returned_later(cx: &Cx<'_>, root: Node<'_>, name: &str) -> bool {
    ScopeView::enclosing(cx, root).is_some_and(|scope| scope.returns_after(cx.file, name, root.end_byte()))
}

/// Right-hand side of an assignment.
fn assigned<'t>(cx: &Cx<'_>, root: Node<'t>) -> Option<StructuralContext<'t>> {
    let assignment = root.parent().filter(|p| p.kind() == ASSIGNMENT_EXPRESSION)?;
    let right = assignment.child_by_field_name("right")?;
    if !nav::same(right, root) {
        return None;
    }
    if assignment
        .parent()
        .is_some_and(|p| p.kind() == INITIALIZER_EXPRESSION)
    {
        return Some(StructuralContext::MemberAssignment);
    }

    let left = nav::unwrap_value(cx.file, assignment.child_by_field_name("left")?);
    let name = match left.kind() {
        IDENTIFIER => left,
        MEMBER_ACCESS_EXPRESSION => {
            let receiver = left.child_by_field_name("expression")?;
            if !is_this(receiver.kind()) && cx.file.node_text(receiver) != "this" {
                return Some(StructuralContext::MemberAssignment);
            }
            left.child_by_field_name("name")?
        }
        _ => return Some(StructuralContext::MemberAssignment),
    };

    let kind = cx.model.symbol_of(cx.file, left).map(|symbol| symbol.kind);
    Some(match kind {
        Some(SymbolKind::Local | SymbolKind::Parameter) => {
            if returned_later(cx, root, cx.file.node_text(name)) {
                StructuralContext::ReturnLaterInMethod
            } else {
                StructuralContext::LocalAssignment { name }
            }
        }
        Some(SymbolKind::Property) => StructuralContext::PropertyAssignment { name },
        _ => StructuralContext::FieldAssignment { name },
    })
}

/// `public Stream S { get; } = new MemoryStream();`
fn property_initializer(root: Node<'_>) -> Option<Node<'_>> {
    let mut parent = root.parent()?;
    if parent.kind() == EQUALS_VALUE_CLAUSE {
        parent = parent.parent()?;
    }
    (parent.kind() == PROPERTY_DECLARATION).then_some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::context::AnalysisContext;
    use crate::semantic::SourceModel;
    use crate::syntax::Descendants;

    /// Classification name of the `n`th construction in `source`.
    fn classify_nth(source: &str, n: usize) -> String {
        let context = AnalysisContext::with_defaults().unwrap();
        let file = SourceFile::parse("structure.cs", source).unwrap();
        let model = SourceModel::build(std::slice::from_ref(&file), context.catalog());
        let cx = Cx {
            file: &file,
            model: &model,
            context: &context,
        };
        let node = Descendants::new(file.root())
            .filter(|node| is_construction(node.kind()))
            .nth(n)
            .unwrap();
        classify(&cx, node).name().to_string()
    }

    fn classify_first(source: &str) -> String {
        classify_nth(source, 0)
    }

    fn in_method(body: &str) -> String {
        classify_first(&format!(
            "class A {{ System.IO.Stream _f; System.IO.Stream P {{ get; set; }} object M(Bag bag) {{ {} }} }}",
            body
        ))
    }

    #[test]
    fn test_local_and_using() {
        assert_eq!(in_method("var s = new X(); return null;"), "local declaration");
        assert_eq!(in_method("using (var s = new X()) { } return null;"), "using header");
        assert_eq!(in_method("using var s = new X(); return null;"), "using header");
    }

    #[test]
    fn test_returns() {
        assert_eq!(in_method("return new X();"), "return in block");
        assert_eq!(in_method("var s = new X(); return s;"), "returned later");
        assert_eq!(in_method("return Run(() => new X());"), "return in lambda");
        assert_eq!(classify_first("class A { object M() => new X(); }"), "return arrow body");
        assert_eq!(
            classify_first("class A { void M() { Run(() => { return new X(); }); } }"),
            "return in lambda"
        );
    }

    #[test]
    fn test_returned_through_arguments() {
        assert_eq!(in_method("return Task.FromResult<X>(new X());"), "return in block");
        assert_eq!(in_method("return Wrap(new W(new X()));"), "return in block");
        assert_eq!(
            classify_nth("class A { object M() { return new W(new X()); } }", 1),
            "return in block"
        );
        assert_eq!(classify_first("class A { object M() => Wrap(new X()); }"), "return arrow body");
        assert_eq!(
            classify_first("class A { void M() { Run(() => Wrap(new X())); } }"),
            "return in lambda"
        );
        assert_eq!(in_method("var s = new X(); return Task.FromResult(s);"), "returned later");
    }

    #[test]
    fn test_property_getter_arguments_stay_arguments() {
        assert_eq!(
            classify_first("class A { X P { get { return Wrap(new X()); } } }"),
            "argument of invocation"
        );
        assert_eq!(classify_first("class A { X P => Wrap(new X()); }"), "argument of invocation");
    }

    #[test]
    fn test_lambda_body() {
        // The creation is the lambda's expression body, not the argument
        assert_eq!(
            classify_first("class A { void M() { System.Func<X> f = () => new X(); } }"),
            "return in lambda"
        );
    }

    #[test]
    fn test_properties() {
        assert_eq!(classify_first("class A { X P { get { return new X(); } } }"), "property return");
        assert_eq!(classify_first("class A { X P => new X(); }"), "property expression body");
        assert_eq!(classify_first("class A { X P { get => new X(); } }"), "property expression body");
        assert_eq!(classify_first("class A { X P { get; } = new X(); }"), "auto property");
    }

    #[test]
    fn test_arguments_and_chains() {
        assert_eq!(in_method("bag.Track(new X()); return null;"), "argument of invocation");
        assert_eq!(in_method("new X().Track(bag); return null;"), "method chain link");
        assert_eq!(in_method("new X().Dispose(); return null;"), "released immediately");
        assert_eq!(in_method("((X)new X()).Dispose(); return null;"), "released immediately");
        assert_eq!(
            classify_nth("class A { void M() { var r = new R(new X()); } }", 1),
            "argument of construction"
        );
    }

    #[test]
    fn test_initializers() {
        assert_eq!(
            classify_nth("class A { void M() { var w = new W(new[] { new X() }); } }", 1),
            "array initializer element"
        );
        assert_eq!(
            classify_nth("class A { void M() { Run(new Holder { new X() }); } }", 1),
            "collection initializer element"
        );
        assert_eq!(
            classify_nth("class A { void M() { var d = new D { { 1, new X() } }; } }", 1),
            "collection initializer element"
        );
    }

    #[test]
    fn test_assignments() {
        assert_eq!(in_method("_f = new X(); return null;"), "field assignment");
        assert_eq!(in_method("this._f = new X(); return null;"), "field assignment");
        assert_eq!(in_method("P = new X(); return null;"), "property assignment");
        assert_eq!(in_method("bag.Item = new X(); return null;"), "member assignment");
        assert_eq!(in_method("X s; s = new X(); return null;"), "local assignment");
        assert_eq!(
            classify_nth("class A { object M() { return new Y { Item = new X() }; } }", 1),
            "member assignment"
        );
        assert_eq!(classify_first("class A { X _f = new X(); }"), "field declaration");
    }

    #[test]
    fn test_anonymous() {
        assert_eq!(in_method("new X(); return null;"), "anonymous");
    }
}

//! Release search for a resource stored in a local variable.

use tree_sitter::Node;

use super::context::Cx;
use super::ownership::{is_release_call_on, is_tracked_type, tracks_ownership};
use super::scope::ScopeView;
use crate::semantic::TypeSymbol;
use crate::syntax::kinds::is_construction;
use crate::syntax::nav;

/// Whether the local `name`, holding a `resource` created at `site`, is
/// released or handed off somewhere in its scope.
pub fn is_released_locally(cx: &Cx<'_>, site: Node<'_>, name: &str, resource: &TypeSymbol) -> bool {
    let Some(scope) = ScopeView::enclosing(cx, site) else {
        return false;
    };

    if scope
        .references_in_using_headers(cx.file, name)
        .any(|reference| header_reference_releases(cx, reference))
    {
        tracing::trace!("`{}` is acquired by a using header", name);
        return true;
    }

    let released = scope.invocations().any(|invocation| {
        is_release_call_on(cx, invocation, name)
            || transfers_to_call(cx, invocation, name)
            || is_release_equivalent(cx, invocation, name, resource)
    });
    released
        || scope
            .creations()
            .any(|creation| passes_to(cx, creation, name) && is_tracked_type(cx, creation))
}

/// A header reference counts unless it only feeds a construction that
/// leaves the resource to the caller.
fn header_reference_releases(cx: &Cx<'_>, reference: Node<'_>) -> bool {
    let root = nav::value_root(cx.file, reference);
    match nav::argument_owner(root) {
        Some(owner) if is_construction(owner.kind()) => is_tracked_type(cx, owner),
        _ => true,
    }
}

/// Some argument of `node` is the local itself.
fn passes_to(cx: &Cx<'_>, node: Node<'_>, name: &str) -> bool {
    nav::arguments(node)
        .into_iter()
        .filter_map(nav::argument_value)
        .any(|value| nav::refers_to(cx.file, value, name))
}

/// `bag.Add(x)` or the extension form `x.DisposeWith(bag)`.
fn transfers_to_call(cx: &Cx<'_>, invocation: Node<'_>, name: &str) -> bool {
    if passes_to(cx, invocation, name) {
        return tracks_ownership(cx, invocation);
    }
    let on_receiver = nav::call_target(invocation)
        .and_then(|target| target.receiver)
        .is_some_and(|receiver| nav::refers_to(cx.file, receiver, name));
    on_receiver
        && tracks_ownership(cx, invocation)
        && cx
            .model
            .symbol_of(cx.file, invocation)
            .is_some_and(|symbol| symbol.is_extension)
}

/// `x.Close()` where `Close` is configured as releasing the local's type.
pub(super) fn is_release_equivalent(cx: &Cx<'_>, invocation: Node<'_>, name: &str, resource: &TypeSymbol) -> bool {
    let Some(target) = nav::call_target(invocation) else {
        return false;
    };
    if !target
        .receiver
        .is_some_and(|receiver| nav::refers_to(cx.file, receiver, name))
    {
        return false;
    }
    let invoked = nav::simple_name(cx.file, target.name);
    cx.context.release_equivalent().iter().any(|rule| {
        resource.implements(&rule.type_name) && rule.methods.iter().any(|m| m.name() == invoked)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::context::AnalysisContext;
    use crate::semantic::{SemanticModel, SourceModel};
    use crate::syntax::kinds::OBJECT_CREATION_EXPRESSION;
    use crate::syntax::{Descendants, SourceFile};

    /// Run the release search for the first construction, stored in `s`.
    fn released(body: &str) -> bool {
        let source = format!(
            r#"
using System.IO;
using System.Reactive.Disposables;
using ReactiveUI;
class T {{
    void M(CompositeDisposable bag) {{
        {}
    }}
}}
"#,
            body
        );
        let context = AnalysisContext::with_defaults().unwrap();
        let file = SourceFile::parse("local.cs", source).unwrap();
        let model = SourceModel::build(std::slice::from_ref(&file), context.catalog());
        let cx = Cx {
            file: &file,
            model: &model,
            context: &context,
        };
        let site = Descendants::of_kind(file.root(), OBJECT_CREATION_EXPRESSION)
            .next()
            .unwrap();
        let ty = model.type_of(&file, site).unwrap();
        is_released_locally(&cx, site, "s", &ty)
    }

    #[test]
    fn test_not_released() {
        assert!(!released("var s = new MemoryStream(); s.Flush();"));
    }

    #[test]
    fn test_explicit_release() {
        assert!(released("var s = new MemoryStream(); s.Dispose();"));
        assert!(released("var s = new MemoryStream(); s?.Dispose();"));
        assert!(released("var s = new MemoryStream(); ((System.IDisposable)s).Dispose();"));
    }

    #[test]
    fn test_release_equivalent() {
        assert!(released("var s = new MemoryStream(); s.Close();"));
    }

    #[test]
    fn test_using_header_reference() {
        assert!(released("var s = new MemoryStream(); using (s) { }"));
        assert!(released("var s = new MemoryStream(); using (var r = new StreamReader(s)) { }"));
        assert!(!released("var s = new MemoryStream(); using (var r = new StreamReader(s, leaveOpen: true)) { }"));
    }

    #[test]
    fn test_transfer_and_tracking_construction() {
        assert!(released("var s = new MemoryStream(); bag.Add(s);"));
        assert!(released("var s = new MemoryStream(); s.DisposeWith(bag);"));
        assert!(released("var s = new MemoryStream(); var r = new StreamReader(s);"));
        assert!(!released("var s = new MemoryStream(); bag.Remove(s);"));
    }
}

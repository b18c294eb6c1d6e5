//! Ownership detector: calls and constructions that take over releasing a
//! resource passed into them.
//!
//! Rules are looked up by resolved symbol only. A rule names the declaring
//! type (or a supertype of it) and the method signature; which argument
//! position carries the resource is not checked.

use tree_sitter::Node;

use super::context::{Cx, TypeRule};
use crate::config::LeaveOpen;
use crate::semantic::SymbolKind;
use crate::syntax::kinds::INVOCATION_EXPRESSION;
use crate::syntax::{nav, SourceFile};

fn invocation_matches(cx: &Cx<'_>, invocation: Node<'_>, rules: &[TypeRule]) -> bool {
    if invocation.kind() != INVOCATION_EXPRESSION {
        return false;
    }
    let Some(symbol) = cx.model.symbol_of(cx.file, invocation) else {
        return false;
    };
    symbol.kind == SymbolKind::Method && rules.iter().any(|rule| rule.matches(&symbol))
}

/// The invoked method is configured to take ownership of its argument.
pub fn tracks_ownership(cx: &Cx<'_>, invocation: Node<'_>) -> bool {
    invocation_matches(cx, invocation, cx.context.ownership_transfer())
}

/// The invoked method is a factory whose results are never reported.
pub fn is_ignored_factory(cx: &Cx<'_>, invocation: Node<'_>) -> bool {
    invocation_matches(cx, invocation, cx.context.ignored_factories())
}

/// The constructed type wraps and releases its resource argument, and the
/// call does not pass `leaveOpen: true`.
pub fn is_tracked_type(cx: &Cx<'_>, creation: Node<'_>) -> bool {
    let Some(ty) = cx.model.type_of(cx.file, creation) else {
        return false;
    };
    match cx.context.tracking_type(&ty) {
        None => false,
        Some(rule) => !rule
            .leave_open
            .as_ref()
            .is_some_and(|leave_open| leaves_open(cx.file, creation, leave_open)),
    }
}

/// The `leaveOpen` argument, by name or position, is literally `true`.
fn leaves_open(file: &SourceFile, creation: Node<'_>, leave_open: &LeaveOpen) -> bool {
    let args = nav::arguments(creation);
    let named = args
        .iter()
        .copied()
        .find(|arg| nav::argument_name(file, *arg) == Some(leave_open.name.as_str()));
    let argument = named.or_else(|| {
        args.get(leave_open.index)
            .copied()
            .filter(|arg| nav::argument_name(file, *arg).is_none())
    });
    argument
        .and_then(nav::argument_value)
        .is_some_and(|value| file.node_text(value).trim() == "true")
}

/// Walk outward through `x.A().B().C()` starting at the first link and
/// return the link that takes ownership, if any. `Err` carries the last
/// link of the chain.
pub fn find_tracking_link<'t>(cx: &Cx<'_>, first: Node<'t>) -> Result<Node<'t>, Node<'t>> {
    let mut current = first;
    loop {
        if tracks_ownership(cx, current) {
            return Ok(current);
        }
        let root = nav::value_root(cx.file, current);
        match nav::invocation_on_receiver(root) {
            Some(next) => current = next,
            None => return Err(current),
        }
    }
}

/// `x.Dispose()`, `x?.Dispose()` or a call through a cast of `x`.
pub fn is_release_call_on(cx: &Cx<'_>, invocation: Node<'_>, name: &str) -> bool {
    let Some(target) = nav::call_target(invocation) else {
        return false;
    };
    cx.context
        .is_release_method(nav::simple_name(cx.file, target.name))
        && target
            .receiver
            .is_some_and(|receiver| nav::refers_to(cx.file, receiver, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::context::AnalysisContext;
    use crate::semantic::SourceModel;
    use crate::syntax::kinds::{INVOCATION_EXPRESSION, OBJECT_CREATION_EXPRESSION};
    use crate::syntax::Descendants;

    fn with_cx(source: &str, check: impl FnOnce(&Cx<'_>)) {
        let context = AnalysisContext::with_defaults().unwrap();
        let file = SourceFile::parse("ownership.cs", source).unwrap();
        let model = SourceModel::build(std::slice::from_ref(&file), context.catalog());
        let cx = Cx {
            file: &file,
            model: &model,
            context: &context,
        };
        check(&cx);
    }

    fn nth<'t>(cx: &Cx<'t>, kind: &'static str, n: usize) -> Node<'t> {
        Descendants::of_kind(cx.file.root(), kind).nth(n).unwrap()
    }

    #[test]
    fn test_leave_open_opts_out() {
        with_cx(
            r#"
using System.IO;
class T {
    void M(Stream s) {
        var a = new StreamReader(s);
        var b = new StreamReader(s, leaveOpen: true);
        var c = new StreamReader(s, null, true, 1024, true);
        var d = new StreamReader(s, leaveOpen: false);
    }
}
"#,
            |cx| {
                assert!(is_tracked_type(cx, nth(cx, OBJECT_CREATION_EXPRESSION, 0)));
                assert!(!is_tracked_type(cx, nth(cx, OBJECT_CREATION_EXPRESSION, 1)));
                assert!(!is_tracked_type(cx, nth(cx, OBJECT_CREATION_EXPRESSION, 2)));
                assert!(is_tracked_type(cx, nth(cx, OBJECT_CREATION_EXPRESSION, 3)));
            },
        );
    }

    #[test]
    fn test_non_tracking_construction() {
        with_cx(
            "using System.IO;\nclass T { void M() { var m = new MemoryStream(); } }",
            |cx| assert!(!is_tracked_type(cx, nth(cx, OBJECT_CREATION_EXPRESSION, 0))),
        );
    }

    #[test]
    fn test_configured_transfer_call() {
        with_cx(
            r#"
using System.IO;
using System.Reactive.Disposables;
class T {
    void M(CompositeDisposable bag) {
        bag.Add(new MemoryStream());
        bag.Remove(new MemoryStream());
    }
}
"#,
            |cx| {
                assert!(tracks_ownership(cx, nth(cx, INVOCATION_EXPRESSION, 0)));
                assert!(!tracks_ownership(cx, nth(cx, INVOCATION_EXPRESSION, 1)));
            },
        );
    }

    #[test]
    fn test_chain_finds_tracking_extension() {
        with_cx(
            r#"
using System.IO;
using System.Reactive.Disposables;
using ReactiveUI;
class T {
    void M(CompositeDisposable bag) {
        new MemoryStream().DisposeWith(bag);
    }
}
"#,
            |cx| {
                let creation = nth(cx, OBJECT_CREATION_EXPRESSION, 0);
                let first = nav::invocation_on_receiver(creation).unwrap();
                assert!(find_tracking_link(cx, first).is_ok());
            },
        );
    }

    #[test]
    fn test_release_call_shapes() {
        with_cx(
            "class T { void M() { s.Dispose(); s?.Dispose(); ((System.IDisposable)s).Dispose(); t.Dispose(); s.Close(); } }",
            |cx| {
                let calls: Vec<_> = Descendants::of_kind(cx.file.root(), INVOCATION_EXPRESSION).collect();
                assert!(is_release_call_on(cx, calls[0], "s"));
                assert!(is_release_call_on(cx, calls[1], "s"));
                assert!(is_release_call_on(cx, calls[2], "s"));
                assert!(!is_release_call_on(cx, calls[3], "s"));
                assert!(!is_release_call_on(cx, calls[4], "s"));
            },
        );
    }
}

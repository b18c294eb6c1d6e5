//! Per-node analysis: filter, classify, then hand the node to the handler
//! for its structural context.
//!
//! The engine is stateless. Each call reads the shared
//! [`AnalysisContext`](super::AnalysisContext) and the semantic model
//! through [`Cx`] and produces at most one diagnostic for the node.

mod handlers;

use tree_sitter::Node;

use super::classifier::needs_release;
use super::context::Cx;
use super::ownership::{is_ignored_factory, tracks_ownership};
use super::reporter::{CreationSource, Diagnostic, DiagnosticKind, Reporter};
use super::structure::{classify, classify_value, StructuralContext};
use crate::syntax::kinds::{is_construction, INVOCATION_EXPRESSION};
use crate::syntax::nav;

/// What a handler decided about one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict<'a> {
    Released,
    Unreleased {
        kind: DiagnosticKind,
        name: Option<&'a str>,
    },
}

impl<'a> Verdict<'a> {
    fn anonymous() -> Self {
        Verdict::Unreleased {
            kind: DiagnosticKind::UnreleasedAnonymous,
            name: None,
        }
    }

    fn named(kind: DiagnosticKind, name: &'a str) -> Self {
        Verdict::Unreleased {
            kind,
            name: Some(name),
        }
    }
}

/// Analyzes resource-creating nodes of one file.
pub(crate) struct NodeAnalyzer<'a> {
    cx: Cx<'a>,
    reporter: Reporter<'a>,
}

impl<'a> NodeAnalyzer<'a> {
    pub(crate) fn new(cx: Cx<'a>) -> Self {
        Self {
            cx,
            reporter: Reporter::new(cx.context, cx.file),
        }
    }

    /// Decide one object creation or invocation.
    pub(crate) fn analyze(&self, node: Node<'_>) -> Option<Diagnostic> {
        let cx = &self.cx;
        let source = if is_construction(node.kind()) {
            CreationSource::ObjectCreation
        } else if node.kind() == INVOCATION_EXPRESSION {
            if is_ignored_factory(cx, node) || tracks_ownership(cx, node) {
                return None;
            }
            CreationSource::Invocation
        } else {
            return None;
        };

        let mut context = classify(cx, node);
        let ty = match context {
            StructuralContext::AwaitedResult { await_expression } => {
                let ty = cx.model.type_of(cx.file, await_expression)?;
                context = classify_value(cx, nav::value_root(cx.file, await_expression));
                ty
            }
            _ => cx.model.type_of(cx.file, node)?,
        };
        if !needs_release(cx.context, &ty) {
            return None;
        }

        let verdict = self.decide(context, node, &ty);
        let (line, column) = cx.file.line_col(node.start_byte());
        tracing::debug!(
            "{}:{}:{}: `{}` in {} -> {:?}",
            cx.file.path().display(),
            line + 1,
            column + 1,
            ty,
            context.name(),
            verdict
        );

        match verdict {
            Verdict::Released => None,
            Verdict::Unreleased { kind, name } => {
                Some(self.reporter.diagnostic(kind, source, node, ty.name(), name))
            }
        }
    }
}

/// Analyze one resource-creating node.
///
/// Returns `None` for nodes that are not resource creations, cannot be
/// resolved, are ignored, or whose resource is released or handed off.
pub fn analyze_node(cx: &Cx<'_>, node: Node<'_>) -> Option<Diagnostic> {
    NodeAnalyzer::new(*cx).analyze(node)
}

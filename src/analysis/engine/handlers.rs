//! One handler per structural context.

use tree_sitter::Node;

use super::{NodeAnalyzer, Verdict};
use crate::analysis::local::{is_release_equivalent, is_released_locally};
use crate::analysis::ownership::{find_tracking_link, is_release_call_on, is_tracked_type, tracks_ownership};
use crate::analysis::reporter::DiagnosticKind;
use crate::analysis::scope::release_designated_methods;
use crate::analysis::structure::StructuralContext;
use crate::semantic::TypeSymbol;
use crate::syntax::kinds::INVOCATION_EXPRESSION;
use crate::syntax::{nav, Descendants};

impl<'a> NodeAnalyzer<'a> {
    pub(super) fn decide(
        &self,
        context: StructuralContext<'_>,
        site: Node<'_>,
        resource: &TypeSymbol,
    ) -> Verdict<'a> {
        use StructuralContext as C;
        match context {
            C::AwaitedResult { .. }
            | C::ReleasedImmediately
            | C::ReturnInBlock
            | C::ReturnArrowBody
            | C::ReturnInLambda
            | C::ReturnLaterInMethod
            | C::UsingHeader => Verdict::Released,

            C::PropertyReturn { property }
            | C::PropertyExpressionBody { property }
            | C::AutoProperty { property } => match nav::declaration_name(property) {
                Some(name) => self.member(site, name, resource, DiagnosticKind::UnreleasedProperty),
                None => Verdict::anonymous(),
            },

            C::ArgumentOfInvocation { invocation } => self.released_if(tracks_ownership(&self.cx, invocation)),
            C::MethodChainLink { invocation } => {
                self.released_if(find_tracking_link(&self.cx, invocation).is_ok())
            }
            C::ArgumentOfConstruction { creation } | C::CollectionInitializerElement { creation } => {
                self.released_if(is_tracked_type(&self.cx, creation))
            }
            C::ArrayInitializerElement { owner } => {
                self.released_if(owner.is_some_and(|owner| is_tracked_type(&self.cx, owner)))
            }

            C::LocalDeclaration { name } | C::LocalAssignment { name } => {
                let name = self.cx.file.node_text(name);
                if is_released_locally(&self.cx, site, name, resource) {
                    Verdict::Released
                } else {
                    Verdict::named(DiagnosticKind::UnreleasedLocal, name)
                }
            }

            C::FieldDeclaration { name } | C::FieldAssignment { name } => {
                self.member(site, name, resource, DiagnosticKind::UnreleasedField)
            }
            C::PropertyAssignment { name } => {
                self.member(site, name, resource, DiagnosticKind::UnreleasedProperty)
            }

            C::MemberAssignment | C::Anonymous => Verdict::anonymous(),
        }
    }

    fn released_if(&self, released: bool) -> Verdict<'a> {
        if released {
            Verdict::Released
        } else {
            Verdict::anonymous()
        }
    }

    /// A field or property is released when a release-designated method of
    /// the declaring type releases it.
    fn member(&self, site: Node<'_>, name: Node<'_>, resource: &TypeSymbol, kind: DiagnosticKind) -> Verdict<'a> {
        let name = self.cx.file.node_text(name);
        let released = release_designated_methods(&self.cx, site)
            .into_iter()
            .flat_map(|method| Descendants::of_kind(method, INVOCATION_EXPRESSION))
            .any(|invocation| {
                is_release_call_on(&self.cx, invocation, name)
                    || is_release_equivalent(&self.cx, invocation, name, resource)
            });
        if released {
            Verdict::Released
        } else {
            Verdict::named(kind, name)
        }
    }
}

//! Type classifier: which resolved types hold a releasable resource.

use super::context::AnalysisContext;
use crate::semantic::TypeSymbol;

/// The type or one of its supertypes is a disposal contract.
pub fn is_tracked_kind(context: &AnalysisContext, ty: &TypeSymbol) -> bool {
    context
        .disposal_contracts()
        .iter()
        .any(|contract| ty.implements(contract))
}

/// The type or one of its supertypes is on the ignore list.
pub fn is_ignored(context: &AnalysisContext, ty: &TypeSymbol) -> bool {
    context
        .ignored_types()
        .iter()
        .any(|ignored| ty.implements(ignored))
}

/// Tracked and not ignored: creations of this type are analyzed.
pub fn needs_release(context: &AnalysisContext, ty: &TypeSymbol) -> bool {
    is_tracked_kind(context, ty) && !is_ignored(context, ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::TypeKind;

    fn ty(name: &str, supertypes: &[&str]) -> TypeSymbol {
        TypeSymbol::new(name, TypeKind::Class).with_supertypes(supertypes.iter().copied())
    }

    #[test]
    fn test_tracked_through_supertypes() {
        let context = AnalysisContext::with_defaults().unwrap();
        assert!(is_tracked_kind(&context, &ty("System.IDisposable", &[])));
        assert!(is_tracked_kind(&context, &ty("App.Res", &["System.IDisposable"])));
        assert!(is_tracked_kind(&context, &ty("App.AsyncRes", &["System.IAsyncDisposable"])));
        assert!(!is_tracked_kind(&context, &ty("System.String", &[])));
    }

    #[test]
    fn test_ignored_types() {
        let context = AnalysisContext::with_defaults().unwrap();
        let task = ty("System.Threading.Tasks.Task", &["System.IDisposable"]);
        assert!(is_ignored(&context, &task));
        assert!(!needs_release(&context, &task));

        let stream = ty("System.IO.MemoryStream", &["System.IO.Stream", "System.IDisposable"]);
        assert!(needs_release(&context, &stream));
    }
}

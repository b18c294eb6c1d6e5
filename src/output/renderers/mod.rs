//! Output renderers for diagnostics.

mod diagnostic;
mod json;

pub use diagnostic::DiagnosticRenderer;
pub use json::JsonRenderer;

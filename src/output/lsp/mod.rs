//! LSP-specific output formatting.

mod diagnostics;

pub use diagnostics::{to_lsp_diagnostic, to_lsp_diagnostics};

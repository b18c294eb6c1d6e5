//! Conversion of findings to `textDocument/publishDiagnostics` payloads.

use lsp_types::{DiagnosticSeverity, NumberOrString, Range};

use crate::analysis::{Diagnostic, Severity};
use crate::util::offset_to_utf16_position;

const SOURCE: &str = "disposal-lint";

/// Convert one diagnostic. `text` is the document it points into; LSP
/// columns are UTF-16 code units.
pub fn to_lsp_diagnostic(diagnostic: &Diagnostic, text: &str) -> lsp_types::Diagnostic {
    let range = Range {
        start: offset_to_utf16_position(text, diagnostic.location.start_byte),
        end: offset_to_utf16_position(text, diagnostic.location.end_byte),
    };
    lsp_types::Diagnostic {
        range,
        severity: Some(match diagnostic.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Info => DiagnosticSeverity::INFORMATION,
        }),
        code: Some(NumberOrString::String(diagnostic.id.clone())),
        source: Some(SOURCE.to_string()),
        message: diagnostic.message(),
        ..Default::default()
    }
}

/// Convert every diagnostic located in one document.
pub fn to_lsp_diagnostics<'a, I>(diagnostics: I, text: &str) -> Vec<lsp_types::Diagnostic>
where
    I: IntoIterator<Item = &'a Diagnostic>,
{
    diagnostics
        .into_iter()
        .map(|diagnostic| to_lsp_diagnostic(diagnostic, text))
        .collect()
}

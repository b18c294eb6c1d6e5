//! Diagnostic renderer - rustc-style with line numbers and underlines.

use crate::analysis::{Diagnostic, DiagnosticKind};
use crate::output::context::RenderContext;
use crate::output::traits::Renderer;

/// Diagnostic renderer - rustc-style with line numbers and underline annotations.
///
/// ```text
/// info[DISP001]: local `s` holds a `MemoryStream` that is never disposed
///    ╭─ src/Program.cs:4:17
///    │
///  4 │         var s = new MemoryStream();
///    │                 ──────────────────
///    ╰─ help: wrap it in a `using` statement or call `.Dispose()` explicitly
/// ```
pub struct DiagnosticRenderer;

impl Renderer for DiagnosticRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut output = String::new();
        for diagnostic in ctx.diagnostics {
            render_one(&mut output, ctx, diagnostic);
            output.push('\n');
        }
        output
    }
}

fn render_one(output: &mut String, ctx: &RenderContext<'_>, diagnostic: &Diagnostic) {
    let location = &diagnostic.location;
    let line_num_width = (location.start_line + 1).to_string().len().max(2);

    output.push_str(&format!(
        "{}[{}]: {}\n",
        diagnostic.severity,
        diagnostic.id,
        diagnostic.message()
    ));
    output.push_str(&format!(
        "{:>width$} ╭─ {}:{}:{}\n",
        "",
        location.path.display(),
        location.start_line + 1,
        location.start_column + 1,
        width = line_num_width
    ));

    if let Some(line) = ctx.line(&location.path, location.start_line) {
        output.push_str(&format!("{:>width$} │\n", "", width = line_num_width));
        output.push_str(&format!(
            "{:>width$} │ {}\n",
            location.start_line + 1,
            line,
            width = line_num_width
        ));

        let start = location.start_column as usize;
        let line_len = line.chars().count();
        let end = if location.end_line == location.start_line {
            location.end_column as usize
        } else {
            line_len
        };
        let width = end.saturating_sub(start).max(1);

        // Tabs in the prefix keep the underline aligned with the source
        let padding: String = line
            .chars()
            .take(start)
            .map(|ch| if ch == '\t' { '\t' } else { ' ' })
            .collect();
        output.push_str(&format!(
            "{:>lw$} │ {}{}\n",
            "",
            padding,
            "─".repeat(width),
            lw = line_num_width
        ));
    }

    output.push_str(&format!(
        "{:>width$} ╰─ help: {}\n",
        "",
        help(diagnostic.kind),
        width = line_num_width
    ));
}

fn help(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::UnreleasedLocal => {
            "wrap it in a `using` statement or call `.Dispose()` explicitly"
        }
        DiagnosticKind::UnreleasedField | DiagnosticKind::UnreleasedProperty => {
            "dispose it from the containing type's `Dispose()` method"
        }
        DiagnosticKind::UnreleasedAnonymous => {
            "store it in a `using` declaration or pass it to an owner that disposes it"
        }
    }
}

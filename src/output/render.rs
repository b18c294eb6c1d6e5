//! Format dispatch.

use super::context::RenderContext;
use super::renderers::{DiagnosticRenderer, JsonRenderer};
use super::traits::Renderer;
use super::types::OutputFormat;

/// Render the context in the requested format.
pub fn render(format: OutputFormat, ctx: &RenderContext<'_>) -> String {
    let renderer: &dyn Renderer = match format {
        OutputFormat::Diagnostic => &DiagnosticRenderer,
        OutputFormat::Json => &JsonRenderer,
    };
    renderer.render(ctx)
}

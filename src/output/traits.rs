//! Renderer trait.

use super::context::RenderContext;

/// Turns a finished analysis into text for a terminal or a tool.
pub trait Renderer {
    /// Render every diagnostic in the context.
    fn render(&self, ctx: &RenderContext<'_>) -> String;
}

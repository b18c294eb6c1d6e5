//! Output formatting for diagnostics.
//!
//! # Available Formats
//!
//! | Format | Description |
//! |--------|-------------|
//! | `diagnostic` | Rustc-style with line numbers, underlines (default) |
//! | `json` | One JSON document for tools |
//!
//! # Adding a New Renderer
//!
//! 1. Implement [`Renderer`]
//! 2. Add variant to [`OutputFormat`] in `types.rs`
//! 3. Add case in [`render()`]
//!
//! # Module Structure
//!
//! - `types` - [`OutputFormat`]
//! - `context` - [`RenderContext`] pairs diagnostics with source lines
//! - `traits` - [`Renderer`]
//! - [`renderers`] - renderer implementations
//! - [`lsp`] - conversion to LSP diagnostics

mod context;
mod render;
mod traits;
mod types;

pub mod lsp;
pub mod renderers;

pub use context::RenderContext;
pub use render::render;
pub use renderers::{DiagnosticRenderer, JsonRenderer};
pub use traits::Renderer;
pub use types::OutputFormat;

pub use lsp::{to_lsp_diagnostic, to_lsp_diagnostics};

//! disposal-lint: static analysis for undisposed C# resources
//!
//! This library parses C# source, resolves expression types against the
//! declarations of the analyzed files plus a configured catalog, and reports
//! every `IDisposable` object that is created and never released or handed
//! to an owner.

pub mod analysis;
pub mod config;
pub mod lsp;
pub mod output;
pub mod semantic;
pub mod syntax;
pub mod testing;
pub mod util;

pub use analysis::{AnalysisContext, Compilation, Diagnostic, DiagnosticKind, Severity};
pub use config::Config;
pub use util::{offset_to_position, offset_to_utf16_position};

//! Disposal analysis.
//!
//! ## Components
//!
//! - **Type classifier** (`classifier.rs`): does a resolved type hold a
//!   releasable resource
//! - **Ownership detector** (`ownership.rs`): calls and constructions that
//!   take over releasing a resource
//! - **Syntax context classifier** (`structure.rs`): where a created value
//!   ends up
//! - **Scope resolvers** (`scope.rs`, `local.rs`): the region a local lives
//!   in and what happens to it there
//! - **Reporter** (`reporter.rs`): diagnostics and sinks
//! - **Engine** (`engine/`): one handler per structural context
//! - **Driver** (`driver.rs`): files, compilations, parallel analysis

mod classifier;
mod context;
mod driver;
mod engine;
mod local;
mod ownership;
mod reporter;
mod scope;
mod structure;

pub use classifier::{is_ignored, is_tracked_kind, needs_release};
pub use context::{AnalysisContext, Cx, MethodPattern, TrackingType, TypeRule};
pub use driver::{analyze_file, analyze_file_into, Compilation};
pub use engine::analyze_node;
pub use ownership::{find_tracking_link, is_ignored_factory, is_tracked_type, tracks_ownership};
pub use reporter::{
    CreationSource, Diagnostic, DiagnosticKind, DiagnosticSink, Location, Reporter, Severity,
};
pub use scope::ScopeView;
pub use structure::{classify, StructuralContext};

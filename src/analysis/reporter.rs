//! Diagnostics and the sink they are delivered to.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use super::context::AnalysisContext;
use crate::syntax::SourceFile;

/// How loudly a finding is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// What kind of holder leaks the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnreleasedLocal,
    UnreleasedField,
    UnreleasedProperty,
    /// The value is never stored anywhere nameable.
    UnreleasedAnonymous,
}

impl DiagnosticKind {
    /// Short label used by expectation comments and renderers.
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::UnreleasedLocal => "local",
            DiagnosticKind::UnreleasedField => "field",
            DiagnosticKind::UnreleasedProperty => "property",
            DiagnosticKind::UnreleasedAnonymous => "anonymous",
        }
    }
}

/// Construct that produced the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationSource {
    ObjectCreation,
    Invocation,
}

/// Span of the creating expression. Lines and columns are zero-based,
/// columns in chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn of(file: &SourceFile, node: Node<'_>) -> Self {
        let (start_line, start_column) = file.line_col(node.start_byte());
        let (end_line, end_column) = file.line_col(node.end_byte());
        Self {
            path: file.path().to_path_buf(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

/// A resource that is created and never released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub source: CreationSource,
    pub location: Location,
    /// Local, field or property holding the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    /// Resolved type of the resource.
    pub type_name: String,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        let name = self.variable_name.as_deref().unwrap_or("?");
        match self.kind {
            DiagnosticKind::UnreleasedLocal => format!(
                "local `{}` holds a `{}` that is never disposed",
                name, self.type_name
            ),
            DiagnosticKind::UnreleasedField => format!(
                "field `{}` holds a `{}` that is never disposed",
                name, self.type_name
            ),
            DiagnosticKind::UnreleasedProperty => format!(
                "property `{}` holds a `{}` that is never disposed",
                name, self.type_name
            ),
            DiagnosticKind::UnreleasedAnonymous => match self.source {
                CreationSource::ObjectCreation => {
                    format!("`{}` created here is never disposed", self.type_name)
                }
                CreationSource::Invocation => {
                    format!("`{}` returned by this call is never disposed", self.type_name)
                }
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.location.path.display(),
            self.location.start_line + 1,
            self.location.start_column + 1,
            self.severity,
            self.id,
            self.message()
        )
    }
}

/// Receives diagnostics from the analysis.
pub trait DiagnosticSink {
    fn accept(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn accept(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Builds diagnostics with the configured id and severity.
pub struct Reporter<'a> {
    context: &'a AnalysisContext,
    file: &'a SourceFile,
}

impl<'a> Reporter<'a> {
    pub fn new(context: &'a AnalysisContext, file: &'a SourceFile) -> Self {
        Self { context, file }
    }

    pub fn diagnostic(
        &self,
        kind: DiagnosticKind,
        source: CreationSource,
        node: Node<'_>,
        type_name: &str,
        variable_name: Option<&str>,
    ) -> Diagnostic {
        Diagnostic {
            id: self.context.diagnostic_id().to_string(),
            severity: self.context.severity(),
            kind,
            source,
            location: Location::of(self.file, node),
            variable_name: variable_name.map(str::to_string),
            type_name: type_name.to_string(),
        }
    }

    pub fn report(
        &self,
        sink: &mut dyn DiagnosticSink,
        kind: DiagnosticKind,
        source: CreationSource,
        node: Node<'_>,
        type_name: &str,
        variable_name: Option<&str>,
    ) {
        sink.accept(self.diagnostic(kind, source, node, type_name, variable_name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::kinds;
    use crate::syntax::Descendants;

    #[test]
    fn test_location_and_message() {
        let context = AnalysisContext::with_defaults().unwrap();
        let file = SourceFile::parse("a.cs", "class A {\n  void M() { var s = new B(); }\n}").unwrap();
        let creation = Descendants::of_kind(file.root(), kinds::OBJECT_CREATION_EXPRESSION)
            .next()
            .unwrap();

        let mut sink: Vec<Diagnostic> = Vec::new();
        Reporter::new(&context, &file).report(
            &mut sink,
            DiagnosticKind::UnreleasedLocal,
            CreationSource::ObjectCreation,
            creation,
            "B",
            Some("s"),
        );

        let diagnostic = &sink[0];
        assert_eq!(diagnostic.id, "DISP001");
        assert_eq!(diagnostic.location.start_line, 1);
        assert_eq!(diagnostic.location.start_column, 21);
        assert_eq!(diagnostic.message(), "local `s` holds a `B` that is never disposed");
        assert_eq!(
            diagnostic.to_string(),
            "a.cs:2:22: info[DISP001]: local `s` holds a `B` that is never disposed"
        );
    }

    #[test]
    fn test_anonymous_message_names_source() {
        let context = AnalysisContext::with_defaults().unwrap();
        let file = SourceFile::parse("a.cs", "class A { void M() { Make(); } }").unwrap();
        let call = Descendants::of_kind(file.root(), kinds::INVOCATION_EXPRESSION)
            .next()
            .unwrap();
        let diagnostic = Reporter::new(&context, &file).diagnostic(
            DiagnosticKind::UnreleasedAnonymous,
            CreationSource::Invocation,
            call,
            "X",
            None,
        );
        assert_eq!(diagnostic.message(), "`X` returned by this call is never disposed");
        assert_eq!(diagnostic.kind.label(), "anonymous");
    }
}

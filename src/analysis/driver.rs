//! Host driver: walks parsed files and feeds every resource-creating node to
//! the engine.

use std::path::PathBuf;

use rayon::prelude::*;

use super::context::{AnalysisContext, Cx};
use super::engine::NodeAnalyzer;
use super::reporter::{Diagnostic, DiagnosticSink};
use crate::semantic::{SemanticModel, SourceModel};
use crate::syntax::kinds::is_resource_creation;
use crate::syntax::{Descendants, ParseError, SourceFile};

/// Analyze one file against any semantic model, delivering diagnostics to
/// `sink` in source order.
pub fn analyze_file_into(
    context: &AnalysisContext,
    model: &dyn SemanticModel,
    file: &SourceFile,
    sink: &mut dyn DiagnosticSink,
) {
    let analyzer = NodeAnalyzer::new(Cx {
        file,
        model,
        context,
    });
    let mut count = 0usize;
    for node in Descendants::new(file.root()).filter(|node| is_resource_creation(node.kind())) {
        if let Some(diagnostic) = analyzer.analyze(node) {
            sink.accept(diagnostic);
            count += 1;
        }
    }
    tracing::info!("{}: {} diagnostics", file.path().display(), count);
}

/// Analyze one file, collecting diagnostics.
pub fn analyze_file(context: &AnalysisContext, model: &dyn SemanticModel, file: &SourceFile) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    analyze_file_into(context, model, file, &mut diagnostics);
    diagnostics
}

/// Parsed files plus the semantic model built from all of them.
///
/// Immutable once built; a changed file means a new compilation.
#[derive(Debug)]
pub struct Compilation {
    files: Vec<SourceFile>,
    model: SourceModel,
}

impl Compilation {
    pub fn new(files: Vec<SourceFile>, context: &AnalysisContext) -> Self {
        let model = SourceModel::build(&files, context.catalog());
        Self { files, model }
    }

    /// Parse `(path, text)` pairs into a compilation.
    pub fn parse<I>(sources: I, context: &AnalysisContext) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (PathBuf, String)>,
    {
        let files = sources
            .into_iter()
            .map(|(path, text)| SourceFile::parse(path, text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(files, context))
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn model(&self) -> &SourceModel {
        &self.model
    }

    /// Analyze every file in parallel. Results keep file order.
    pub fn analyze(&self, context: &AnalysisContext) -> Vec<Diagnostic> {
        let per_file: Vec<Vec<Diagnostic>> = self
            .files
            .par_iter()
            .map(|file| analyze_file(context, &self.model, file))
            .collect();
        per_file.into_iter().flatten().collect()
    }
}

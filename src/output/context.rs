//! Render context - diagnostics plus the sources they point into.

use std::collections::HashMap;
use std::path::Path;

use crate::analysis::Diagnostic;
use crate::syntax::SourceFile;

/// Context passed to renderers.
pub struct RenderContext<'a> {
    pub diagnostics: &'a [Diagnostic],
    sources: HashMap<&'a Path, Vec<&'a str>>,
}

impl<'a> RenderContext<'a> {
    pub fn new(files: &'a [SourceFile], diagnostics: &'a [Diagnostic]) -> Self {
        let sources = files
            .iter()
            .map(|file| (file.path(), file.text().lines().collect()))
            .collect();
        Self {
            diagnostics,
            sources,
        }
    }

    /// Context without source text; renderers fall back to locations only.
    pub fn without_sources(diagnostics: &'a [Diagnostic]) -> Self {
        Self {
            diagnostics,
            sources: HashMap::new(),
        }
    }

    /// Zero-based source line of a file, when the file is known.
    pub fn line(&self, path: &Path, index: u32) -> Option<&'a str> {
        self.sources
            .get(path)
            .and_then(|lines| lines.get(index as usize))
            .copied()
    }

    pub fn line_count(&self, path: &Path) -> usize {
        self.sources.get(path).map_or(0, Vec::len)
    }
}

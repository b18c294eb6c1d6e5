//! LSP document state and diagnostics publishing.

use std::collections::HashMap;
use std::path::PathBuf;

use lsp_types::{PublishDiagnosticsParams, Uri};

use crate::analysis::{AnalysisContext, Compilation};
use crate::output::to_lsp_diagnostics;
use crate::syntax::SourceFile;

type Url = Uri;

/// State for the LSP server.
///
/// Every open document belongs to one compilation, so types declared in
/// one open file resolve in the others. Any change rebuilds it.
pub struct ServerState {
    /// Document contents by URI
    documents: HashMap<Url, String>,
    context: AnalysisContext,
}

impl ServerState {
    pub fn new(context: AnalysisContext) -> Self {
        Self {
            documents: HashMap::new(),
            context,
        }
    }

    pub fn document(&self, uri: &Url) -> Option<&str> {
        self.documents.get(uri).map(String::as_str)
    }

    /// Open a document and re-analyze.
    pub fn open_document(&mut self, uri: Url, content: String) -> Vec<PublishDiagnosticsParams> {
        self.documents.insert(uri, content);
        self.analyze()
    }

    /// Update a document and re-analyze.
    pub fn update_document(&mut self, uri: Url, content: String) -> Vec<PublishDiagnosticsParams> {
        self.documents.insert(uri, content);
        self.analyze()
    }

    /// Re-analyze after a save, taking the saved text when the client sends it.
    pub fn save_document(&mut self, uri: Url, content: Option<String>) -> Vec<PublishDiagnosticsParams> {
        if let Some(content) = content {
            self.documents.insert(uri, content);
        }
        self.analyze()
    }

    /// Close a document: its diagnostics are cleared, the rest re-published.
    pub fn close_document(&mut self, uri: &Url) -> Vec<PublishDiagnosticsParams> {
        self.documents.remove(uri);
        let mut params = vec![PublishDiagnosticsParams::new(uri.clone(), Vec::new(), None)];
        params.extend(self.analyze());
        params
    }

    /// Analyze all open documents as one compilation.
    fn analyze(&self) -> Vec<PublishDiagnosticsParams> {
        let mut uris: HashMap<PathBuf, &Url> = HashMap::new();
        let mut files = Vec::new();
        for (uri, text) in &self.documents {
            let path = PathBuf::from(uri.as_str());
            match SourceFile::parse(path.clone(), text.clone()) {
                Ok(file) => {
                    uris.insert(path, uri);
                    files.push(file);
                }
                Err(e) => tracing::warn!("Failed to parse {}: {}", uri.as_str(), e),
            }
        }

        let compilation = Compilation::new(files, &self.context);
        let diagnostics = compilation.analyze(&self.context);
        tracing::debug!(
            "Analyzed {} documents: {} diagnostics",
            compilation.files().len(),
            diagnostics.len()
        );

        compilation
            .files()
            .iter()
            .filter_map(|file| {
                let uri = uris.get(file.path())?;
                let own = diagnostics.iter().filter(|d| d.location.path == file.path());
                Some(PublishDiagnosticsParams::new(
                    (*uri).clone(),
                    to_lsp_diagnostics(own, file.text()),
                    None,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Url {
        format!("file:///project/{}", path).parse().unwrap()
    }

    fn count_for(params: &[PublishDiagnosticsParams], target: &Url) -> Option<usize> {
        params
            .iter()
            .find(|p| &p.uri == target)
            .map(|p| p.diagnostics.len())
    }

    const LEAK: &str = "using System.IO; class A { void M() { var s = new MemoryStream(); } }";
    const FIXED: &str = "using System.IO; class A { void M() { using var s = new MemoryStream(); } }";

    #[test]
    fn test_open_change_close() {
        let mut state = ServerState::new(AnalysisContext::with_defaults().unwrap());
        let a = uri("A.cs");

        let published = state.open_document(a.clone(), LEAK.to_string());
        assert_eq!(count_for(&published, &a), Some(1));

        let published = state.update_document(a.clone(), FIXED.to_string());
        assert_eq!(count_for(&published, &a), Some(0));

        let published = state.close_document(&a);
        assert_eq!(count_for(&published, &a), Some(0));
        assert!(state.document(&a).is_none());
    }

    #[test]
    fn test_types_resolve_across_open_documents() {
        let mut state = ServerState::new(AnalysisContext::with_defaults().unwrap());
        let res = uri("Res.cs");
        let user = uri("User.cs");

        state.open_document(
            res.clone(),
            "public class Res : System.IDisposable { public void Dispose() { } }".to_string(),
        );
        let published = state.open_document(
            user.clone(),
            "class U { void M() { var r = new Res(); } }".to_string(),
        );
        assert_eq!(count_for(&published, &user), Some(1));
        assert_eq!(count_for(&published, &res), Some(0));

        let published = state.close_document(&res);
        assert_eq!(count_for(&published, &user), Some(0));
    }
}

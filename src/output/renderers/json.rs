//! JSON renderer.

use serde_json::{json, Value};

use crate::output::context::RenderContext;
use crate::output::traits::Renderer;

/// One JSON document: `{ "count": n, "diagnostics": [...] }`, each
/// diagnostic carrying its rendered `message`.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let diagnostics: Vec<Value> = ctx
            .diagnostics
            .iter()
            .map(|diagnostic| {
                let mut value = json!(diagnostic);
                value["message"] = Value::String(diagnostic.message());
                value
            })
            .collect();
        let document = json!({
            "count": diagnostics.len(),
            "diagnostics": diagnostics,
        });
        format!("{:#}\n", document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisContext, Compilation};
    use std::path::PathBuf;

    #[test]
    fn test_document_shape() {
        let context = AnalysisContext::with_defaults().unwrap();
        let compilation = Compilation::parse(
            [(
                PathBuf::from("A.cs"),
                "using System.IO; class A { void M() { var s = new MemoryStream(); } }".to_string(),
            )],
            &context,
        )
        .unwrap();
        let diagnostics = compilation.analyze(&context);
        let output = JsonRenderer.render(&RenderContext::new(compilation.files(), &diagnostics));

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["count"], 1);
        let first = &parsed["diagnostics"][0];
        assert_eq!(first["kind"], "unreleased_local");
        assert_eq!(first["source"], "object_creation");
        assert_eq!(first["variable_name"], "s");
        assert_eq!(first["severity"], "info");
        assert_eq!(first["location"]["start_line"], 0);
        assert!(first["message"].as_str().unwrap().contains("`s`"));
    }
}

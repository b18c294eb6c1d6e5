//! Integration tests over the sample programs in test-fixtures/samples.
//!
//! Samples are realistic C# files. Their `//~` comments are verified like
//! spec fixtures; the tests here also exercise whole-compilation analysis,
//! rendering and configuration layering on them.

use disposal_lint::analysis::{AnalysisContext, Compilation, Diagnostic, DiagnosticKind};
use disposal_lint::config::Config;
use disposal_lint::output::{render, to_lsp_diagnostics, OutputFormat, RenderContext};
use disposal_lint::testing::{
    fixture_files, format_results, verify_directory, verify_source_with_context, VerificationError,
};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-fixtures")
}

fn samples_dir() -> PathBuf {
    fixtures_dir().join("samples")
}

fn load_samples() -> Vec<(PathBuf, String)> {
    fixture_files(&samples_dir())
        .into_iter()
        .map(|path| {
            let text = std::fs::read_to_string(&path).expect("sample should be readable");
            (path, text)
        })
        .collect()
}

fn analyze_samples(context: &AnalysisContext) -> (Compilation, Vec<Diagnostic>) {
    let compilation = Compilation::parse(load_samples(), context).expect("samples should parse");
    let diagnostics = compilation.analyze(context);
    (compilation, diagnostics)
}

#[test]
fn test_sample_expectations() {
    let results = verify_directory(&samples_dir()).expect("samples should load");
    assert!(results.len() >= 2, "expected at least two samples");

    let failed: Vec<String> = results
        .iter()
        .filter(|result| !result.passed())
        .map(format_results)
        .collect();
    assert!(failed.is_empty(), "sample expectations failed:\n{}", failed.join("\n"));
}

#[test]
fn test_crypto_sample_findings() {
    let context = AnalysisContext::with_defaults().unwrap();
    let (_, diagnostics) = analyze_samples(&context);

    let crypto: Vec<(DiagnosticKind, Option<&str>, &str)> = diagnostics
        .iter()
        .filter(|d| d.location.path.ends_with("crypto.cs"))
        .map(|d| (d.kind, d.variable_name.as_deref(), d.type_name.as_str()))
        .collect();

    assert_eq!(
        crypto,
        vec![
            (DiagnosticKind::UnreleasedLocal, Some("aes"), "Aes"),
            (DiagnosticKind::UnreleasedLocal, Some("reader"), "StreamReader"),
            (DiagnosticKind::UnreleasedAnonymous, None, "SHA256"),
            (DiagnosticKind::UnreleasedField, Some("_md5"), "MD5"),
        ]
    );
}

#[test]
fn test_analysis_is_idempotent() {
    let context = AnalysisContext::with_defaults().unwrap();
    let (compilation, first) = analyze_samples(&context);
    let second = compilation.analyze(&context);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_diagnostics_carry_configured_identity() {
    let config = Config::defaults()
        .unwrap()
        .extend(Config::from_toml("diagnostic_id = \"LEAK42\"\nanalysis_severity = \"strict\"", "inline").unwrap());
    let context = AnalysisContext::new(&config).unwrap();
    let (_, diagnostics) = analyze_samples(&context);

    assert!(!diagnostics.is_empty());
    for diagnostic in &diagnostics {
        assert_eq!(diagnostic.id, "LEAK42");
        assert_eq!(diagnostic.severity, disposal_lint::analysis::Severity::Error);
    }
}

#[test]
fn test_custom_configuration_changes_findings() {
    let path = fixtures_dir().join("specs").join("custom_bag.cs");
    let source = std::fs::read_to_string(&path).unwrap();

    // Without its sibling configuration, the project-specific API is unknown
    let defaults = AnalysisContext::with_defaults().unwrap();
    let err = verify_source_with_context(&path, &source, &defaults).unwrap_err();
    let VerificationError::TestFailures(result) = err else {
        panic!("expected test failures, got {}", err);
    };
    let failed: Vec<&str> = result
        .cases
        .iter()
        .filter(|case| !case.passed())
        .map(|case| case.name.as_str())
        .collect();
    assert_eq!(failed, vec!["TrackedByBag", "ReleasedInShutdown"]);

    let config = Config::from_file(&path.with_extension("toml")).unwrap();
    let custom = AnalysisContext::new(&config).unwrap();
    let result = verify_source_with_context(&path, &source, &custom).unwrap();
    assert!(result.passed());
}

#[test]
fn test_render_formats() {
    let context = AnalysisContext::with_defaults().unwrap();
    let (compilation, diagnostics) = analyze_samples(&context);
    let ctx = RenderContext::new(compilation.files(), &diagnostics);

    let text = render(OutputFormat::Diagnostic, &ctx);
    assert!(text.contains("info[DISP001]: local `aes` holds a `Aes` that is never disposed"));
    assert!(text.contains("var aes = Aes.Create();"));

    let json: serde_json::Value =
        serde_json::from_str(&render(OutputFormat::Json, &ctx)).expect("JSON output should parse");
    assert_eq!(json["count"], diagnostics.len());
    assert_eq!(json["diagnostics"][0]["kind"], "unreleased_local");
}

#[test]
fn test_lsp_conversion_of_samples() {
    let context = AnalysisContext::with_defaults().unwrap();
    let (compilation, diagnostics) = analyze_samples(&context);

    for file in compilation.files() {
        let own: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.location.path == file.path())
            .collect();
        let converted = to_lsp_diagnostics(own.iter().copied(), file.text());
        assert_eq!(converted.len(), own.len());
        for (lsp, diagnostic) in converted.iter().zip(&own) {
            assert_eq!(lsp.range.start.line, diagnostic.location.start_line);
            assert_eq!(lsp.source.as_deref(), Some("disposal-lint"));
        }
    }
}

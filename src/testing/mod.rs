//! Test infrastructure for disposal expectation tests.
//!
//! Expected diagnostics are embedded directly in C# fixtures using `//~`
//! comments. Every line must report exactly the diagnostics its comments
//! name: a missing diagnostic and an unexpected one both fail.
//!
//! # Test Organization
//!
//! Each fixture file is a test suite ("describe"), each top-level type
//! declaration is a test case ("it"):
//!
//! ```text
//! // File: locals.cs - describes local variable handling
//! class DisposedInFinally {
//!     void M() {
//!         var s = new MemoryStream();
//!         try { } finally { s.Dispose(); }
//!     }
//! }
//!
//! class NeverDisposed {
//!     void M() {
//!         var s = new MemoryStream();     //~ local: s
//!     }
//! }
//! ```
//!
//! A type without any `//~` comment asserts that nothing in it is reported.
//! A `<stem>.toml` file next to the fixture extends the default
//! configuration for that fixture only.
//!
//! # Usage
//!
//! ```rust,ignore
//! use disposal_lint::testing::verify_file;
//!
//! if let Err(e) = verify_file(&path) {
//!     panic!("{}", e);
//! }
//! ```

pub mod error;
pub mod expectation;
pub mod matcher;

pub use error::{CaseTestResult, ExpectationFailure, FileTestResult, VerificationError};
pub use expectation::{parse_kind, Expectation, ExpectationSet};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisContext, Compilation, Diagnostic};
use crate::config::Config;
use crate::syntax::{kinds, nav, Descendants, SourceFile};
use matcher::match_line;

const TOP_LEVEL: &str = "(top level)";

/// A test case discovered in a fixture file.
#[derive(Debug)]
pub struct TestCase {
    /// Type name (becomes the test name).
    pub name: String,
    /// Line range (start, end) - 0-indexed, inclusive.
    pub line_range: (u32, u32),
}

impl TestCase {
    fn contains(&self, line: u32) -> bool {
        line >= self.line_range.0 && line <= self.line_range.1
    }
}

/// Discover the outermost type declarations of a file.
///
/// Types nested inside other types belong to their outer case; types in a
/// namespace count as outermost.
pub fn discover_test_cases(file: &SourceFile) -> Vec<TestCase> {
    Descendants::new(file.root())
        .filter(|node| kinds::is_type_declaration(node.kind()))
        .filter(|node| nav::enclosing_type(*node).is_none())
        .map(|node| TestCase {
            name: nav::declaration_name(node)
                .map(|name| file.node_text(name).to_string())
                .unwrap_or_else(|| format!("<anonymous@{}>", node.start_position().row + 1)),
            line_range: (
                node.start_position().row as u32,
                node.end_position().row as u32,
            ),
        })
        .collect()
}

/// Leading `//` comment lines of a fixture, without the slashes.
fn fixture_summary(source: &str) -> Option<String> {
    let lines: Vec<&str> = source
        .lines()
        .map(str::trim_start)
        .take_while(|line| line.starts_with("//") && !line.starts_with("//~"))
        .map(|line| line.trim_start_matches('/').trim())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Configuration for a fixture: the defaults, extended by `<stem>.toml`
/// next to it when present.
pub fn fixture_context(path: &Path) -> Result<AnalysisContext, VerificationError> {
    let sibling = path.with_extension("toml");
    let config = if sibling.is_file() {
        tracing::debug!("{}: using {}", path.display(), sibling.display());
        Config::from_file(&sibling)
    } else {
        Config::defaults()
    }
    .map_err(|e| VerificationError::Config(e.to_string()))?;

    AnalysisContext::new(&config).map_err(|e| VerificationError::Config(e.to_string()))
}

/// Verify expectations in a fixture file.
///
/// Loads the file and its sibling configuration, runs the analysis and
/// compares reported diagnostics against expectations.
pub fn verify_file(path: &Path) -> Result<FileTestResult, VerificationError> {
    let source = std::fs::read_to_string(path).map_err(|source| VerificationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let context = fixture_context(path)?;
    verify_source_with_context(path, &source, &context)
}

/// Verify expectations in source code using the default configuration.
pub fn verify_source(path: &Path, source: &str) -> Result<FileTestResult, VerificationError> {
    let context =
        AnalysisContext::with_defaults().map_err(|e| VerificationError::Config(e.to_string()))?;
    verify_source_with_context(path, source, &context)
}

/// Verify expectations in source code.
///
/// This is the main entry point for testing. It:
/// 1. Parses the source and its `//~` expectations
/// 2. Discovers test cases (outermost type declarations)
/// 3. Analyzes the file as a single-file compilation
/// 4. Matches diagnostics to expectations line by line, per case
pub fn verify_source_with_context(
    path: &Path,
    source: &str,
    context: &AnalysisContext,
) -> Result<FileTestResult, VerificationError> {
    let compilation = Compilation::parse([(path.to_path_buf(), source.to_string())], context)
        .map_err(|e| VerificationError::AnalysisFailed(e.to_string()))?;
    let Some(file) = compilation.files().first() else {
        return Err(VerificationError::AnalysisFailed("no file parsed".to_string()));
    };

    let (expectations, errors) = ExpectationSet::parse(file);
    if !errors.is_empty() {
        return Err(VerificationError::ParseErrors(errors));
    }

    let diagnostics = compilation.analyze(context);
    let cases = discover_test_cases(file);
    let lines: Vec<&str> = source.lines().collect();

    let mut results: Vec<CaseTestResult> = cases
        .iter()
        .map(|case| CaseTestResult {
            name: case.name.clone(),
            failures: verify_case(
                &case.name,
                &expectations.within(case.line_range.0, case.line_range.1),
                diagnostics.iter().filter(|d| case.contains(d.location.start_line)),
                &lines,
            ),
        })
        .collect();

    // Expectations and diagnostics outside every type, e.g. top-level statements
    let outside = |line: u32| !cases.iter().any(|case| case.contains(line));
    let stray_expectations = ExpectationSet {
        by_line: expectations
            .by_line
            .iter()
            .filter(|(line, _)| outside(**line))
            .map(|(line, exps)| (*line, exps.clone()))
            .collect(),
    };
    let stray_diagnostics: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| outside(d.location.start_line))
        .collect();
    if !stray_expectations.is_empty() || !stray_diagnostics.is_empty() {
        results.push(CaseTestResult {
            name: TOP_LEVEL.to_string(),
            failures: verify_case(TOP_LEVEL, &stray_expectations, stray_diagnostics, &lines),
        });
    }

    let result = FileTestResult {
        path: path.to_path_buf(),
        summary: fixture_summary(source),
        cases: results,
    };

    if result.passed() {
        Ok(result)
    } else {
        Err(VerificationError::TestFailures(result))
    }
}

/// Verify every `.cs` fixture below a directory.
///
/// Files with failing cases are returned as results; configuration and
/// parse problems abort.
pub fn verify_directory(dir: &Path) -> Result<Vec<FileTestResult>, VerificationError> {
    let mut results = Vec::new();
    for path in fixture_files(dir) {
        match verify_file(&path) {
            Ok(result) => results.push(result),
            Err(VerificationError::TestFailures(result)) => results.push(result),
            Err(e) => return Err(e),
        }
    }
    Ok(results)
}

/// `.cs` files below a directory, sorted.
pub fn fixture_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = dir.join("**").join("*.cs");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .map(|paths| paths.flatten().collect())
        .unwrap_or_default();
    files.sort();
    files
}

/// Match a case's diagnostics against its expectations, line by line.
fn verify_case<'d>(
    case: &str,
    expectations: &ExpectationSet,
    diagnostics: impl IntoIterator<Item = &'d Diagnostic>,
    lines: &[&str],
) -> Vec<ExpectationFailure> {
    let mut by_line: BTreeMap<u32, Vec<&Diagnostic>> = BTreeMap::new();
    for diagnostic in diagnostics {
        by_line
            .entry(diagnostic.location.start_line)
            .or_default()
            .push(diagnostic);
    }

    let mut all_lines: Vec<u32> = expectations
        .by_line
        .keys()
        .chain(by_line.keys())
        .copied()
        .collect();
    all_lines.sort_unstable();
    all_lines.dedup();

    let mut failures = Vec::new();
    for line in all_lines {
        let expected = expectations.get(line).map(Vec::as_slice).unwrap_or(&[]);
        let actual = by_line.get(&line).map(Vec::as_slice).unwrap_or(&[]);
        let source_line = lines.get(line as usize).copied().unwrap_or_default();

        for result in match_line(expected, actual) {
            failures.push(ExpectationFailure {
                case: case.to_string(),
                line: line + 1,
                result,
                source_line: source_line.to_string(),
            });
        }
    }
    failures
}

/// Format test results for display.
pub fn format_results(result: &FileTestResult) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", result.path.display()));

    for case in &result.cases {
        if case.passed() {
            output.push_str(&format!("  \u{2713} {}\n", case.name));
        } else {
            output.push_str(&format!("  \u{2717} {}\n", case.name));
            for failure in &case.failures {
                output.push_str(&format!("      {}\n", failure));
            }
        }
    }

    output.push_str(&format!(
        "\n{} passed, {} failed\n",
        result.pass_count(),
        result.fail_count()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"// Locals that are and are not disposed.
using System.IO;

namespace Fixtures
{
    class Disposed
    {
        void M()
        {
            var s = new MemoryStream();
            s.Dispose();
        }
    }

    class Leaked
    {
        void M()
        {
            var s = new MemoryStream();     //~ local: s
        }

        class Nested { }
    }
}
"#;

    #[test]
    fn test_discover_cases() {
        let file = SourceFile::parse("cases.cs", SOURCE).unwrap();
        let cases = discover_test_cases(&file);
        let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Disposed", "Leaked"]);
        assert!(cases[1].contains(18));
    }

    #[test]
    fn test_fixture_summary() {
        assert_eq!(
            fixture_summary(SOURCE).as_deref(),
            Some("Locals that are and are not disposed.")
        );
        assert_eq!(fixture_summary("class A { }"), None);
    }

    #[test]
    fn test_verify_source_passes() {
        let result = verify_source(Path::new("cases.cs"), SOURCE).unwrap();
        assert_eq!(result.total(), 2);
        assert!(result.passed());
    }

    #[test]
    fn test_verify_source_reports_missing_expectation() {
        let source = SOURCE.replace("//~ local: s", "");
        let err = verify_source(Path::new("cases.cs"), &source).unwrap_err();
        let VerificationError::TestFailures(result) = err else {
            panic!("expected test failures, got {}", err);
        };
        assert_eq!(result.pass_count(), 1);
        assert_eq!(result.fail_count(), 1);
        let rendered = format_results(&result);
        assert!(rendered.contains("\u{2717} Leaked"));
        assert!(rendered.contains("unexpected local: s (MemoryStream)"));
    }

    #[test]
    fn test_verify_source_reports_wrong_name() {
        let source = SOURCE.replace("//~ local: s", "//~ local: t");
        let err = verify_source(Path::new("cases.cs"), &source).unwrap_err();
        assert!(err.to_string().contains("expected `local: t`"));
    }

    #[test]
    fn test_parse_errors_abort() {
        let source = SOURCE.replace("//~ local: s", "//~ leak: s");
        let err = verify_source(Path::new("cases.cs"), &source).unwrap_err();
        assert!(matches!(err, VerificationError::ParseErrors(_)));
    }
}

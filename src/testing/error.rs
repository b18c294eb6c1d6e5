//! Error types for expectation verification.

use std::path::PathBuf;

use super::expectation::ParseError;
use super::matcher::MatchResult;

/// A single expectation failure.
#[derive(Debug, Clone)]
pub struct ExpectationFailure {
    /// Type declaration the failure belongs to.
    pub case: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// The match result describing the failure.
    pub result: MatchResult,
    /// The source line content.
    pub source_line: String,
}

impl std::fmt::Display for ExpectationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.result {
            MatchResult::Match => write!(f, "ok")?,
            MatchResult::Missing { expected } => {
                write!(f, "expected `{}`, but nothing was reported", expected.raw)?
            }
            MatchResult::Unexpected {
                kind,
                name,
                type_name,
            } => match name {
                Some(name) => write!(
                    f,
                    "unexpected {}: {} ({})",
                    kind.label(),
                    name,
                    type_name
                )?,
                None => write!(f, "unexpected {} ({})", kind.label(), type_name)?,
            },
        }
        if !self.source_line.is_empty() {
            write!(f, "\n          | {}", self.source_line.trim())?;
        }
        Ok(())
    }
}

/// Result of running a single test case.
#[derive(Debug)]
pub struct CaseTestResult {
    /// Type name, or `(top level)`.
    pub name: String,
    /// List of failures (empty if passed).
    pub failures: Vec<ExpectationFailure>,
}

impl CaseTestResult {
    /// Returns true if the test passed (no failures).
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of running all tests in a fixture file.
#[derive(Debug)]
pub struct FileTestResult {
    /// Path to the fixture file.
    pub path: PathBuf,
    /// Leading `///` summary of the fixture, shown on failure.
    pub summary: Option<String>,
    /// Results for each case in the file.
    pub cases: Vec<CaseTestResult>,
}

impl FileTestResult {
    /// Returns true if all tests passed.
    pub fn passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed())
    }

    /// Count of passed tests.
    pub fn pass_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    /// Count of failed tests.
    pub fn fail_count(&self) -> usize {
        self.cases.iter().filter(|c| !c.passed()).count()
    }

    /// Total number of tests.
    pub fn total(&self) -> usize {
        self.cases.len()
    }
}

/// Error during verification.
#[derive(Debug)]
pub enum VerificationError {
    /// Fixture could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// Parse errors in expectations
    ParseErrors(Vec<ParseError>),
    /// Sibling configuration failed to load
    Config(String),
    /// Source could not be parsed
    AnalysisFailed(String),
    /// Test failures
    TestFailures(FileTestResult),
}

impl std::fmt::Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            VerificationError::ParseErrors(errors) => {
                writeln!(f, "Parse errors:")?;
                for e in errors {
                    writeln!(f, "  {}", e)?;
                }
                Ok(())
            }
            VerificationError::Config(msg) => write!(f, "Failed to load configuration: {}", msg),
            VerificationError::AnalysisFailed(msg) => write!(f, "Analysis failed: {}", msg),
            VerificationError::TestFailures(result) => {
                if let Some(summary) = &result.summary {
                    writeln!(f, "{}", summary)?;
                }
                f.write_str(&super::format_results(result))
            }
        }
    }
}

impl std::error::Error for VerificationError {}

//! Expectation parsing for disposal tests.
//!
//! `//~` comments in C# fixtures state which diagnostics a line must
//! produce. Comments are found through the syntax tree, so a `//~` inside a
//! string literal is never mistaken for an expectation.
//!
//! # Syntax
//!
//! ```text
//! //~ local: s                // UnreleasedLocal naming `s`
//! //~ field: _f, anonymous    // Several diagnostics on one line
//! //~ anonymous               // UnreleasedAnonymous
//! //~^ property: P            // Applies to the line above
//! //~^^ local                 // Two lines above, any name
//! ```
//!
//! # Kinds
//!
//! | Name | Diagnostic |
//! |------|------------|
//! | `local` | Unreleased local variable |
//! | `field` | Unreleased field |
//! | `property` | Unreleased property |
//! | `anonymous` | Value never stored anywhere nameable |

use std::collections::BTreeMap;

use crate::analysis::DiagnosticKind;
use crate::syntax::kinds::COMMENT;
use crate::syntax::{Descendants, SourceFile};

const MARKER: &str = "//~";

/// A single expected diagnostic parsed from a `//~` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub kind: DiagnosticKind,
    /// Variable name; `None` accepts any name.
    pub name: Option<String>,
    /// Target line (0-indexed).
    pub line: u32,
    /// Original comment text for error messages.
    pub raw: String,
}

impl Expectation {
    /// Whether a diagnostic satisfies this expectation.
    pub fn accepts(&self, kind: DiagnosticKind, name: Option<&str>) -> bool {
        self.kind == kind
            && self
                .name
                .as_deref()
                .map_or(true, |expected| Some(expected) == name)
    }
}

/// Error during expectation parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown diagnostic kind
    UnknownKind { line: u32, kind: String },
    /// Name given for a kind that has none
    UnexpectedName { line: u32, text: String },
    /// Colon without a name
    MissingName { line: u32, kind: String },
    /// Caret offset points above the first line
    OffsetOutOfRange { line: u32 },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnknownKind { line, kind } => {
                write!(f, "line {}: unknown diagnostic kind '{}'", line + 1, kind)
            }
            ParseError::UnexpectedName { line, text } => {
                write!(f, "line {}: anonymous diagnostics have no name: '{}'", line + 1, text)
            }
            ParseError::MissingName { line, kind } => {
                write!(f, "line {}: missing name after '{}:'", line + 1, kind)
            }
            ParseError::OffsetOutOfRange { line } => {
                write!(f, "line {}: '^' points above the first line", line + 1)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a kind label as written in expectations and renderers.
pub fn parse_kind(text: &str) -> Option<DiagnosticKind> {
    match text.trim() {
        "local" => Some(DiagnosticKind::UnreleasedLocal),
        "field" => Some(DiagnosticKind::UnreleasedField),
        "property" => Some(DiagnosticKind::UnreleasedProperty),
        "anonymous" => Some(DiagnosticKind::UnreleasedAnonymous),
        _ => None,
    }
}

/// All expectations for a source file, grouped by line.
#[derive(Debug, Default)]
pub struct ExpectationSet {
    /// Expectations grouped by line number (0-indexed).
    pub by_line: BTreeMap<u32, Vec<Expectation>>,
}

impl ExpectationSet {
    /// Create an empty expectation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse all `//~` expectations from a parsed file.
    ///
    /// Returns the expectation set and any parse errors encountered.
    pub fn parse(file: &SourceFile) -> (Self, Vec<ParseError>) {
        let mut set = ExpectationSet::new();
        let mut errors = Vec::new();

        for comment in Descendants::of_kind(file.root(), COMMENT) {
            let text = file.node_text(comment);
            let Some(after_marker) = text.strip_prefix(MARKER) else {
                continue;
            };
            let line = comment.start_position().row as u32;

            let (target_line, content) = match parse_line_offset(after_marker, line) {
                Some(parsed) => parsed,
                None => {
                    errors.push(ParseError::OffsetOutOfRange { line });
                    continue;
                }
            };

            match parse_expectation_content(content, target_line) {
                Ok(expectations) => {
                    set.by_line.entry(target_line).or_default().extend(expectations);
                }
                Err(e) => errors.push(e),
            }
        }

        (set, errors)
    }

    /// Get expectations for a specific line.
    pub fn get(&self, line: u32) -> Option<&Vec<Expectation>> {
        self.by_line.get(&line)
    }

    /// Check if there are any expectations.
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    /// Get total number of expectations.
    pub fn len(&self) -> usize {
        self.by_line.values().map(Vec::len).sum()
    }

    /// Expectations targeting lines in `start..=end`.
    pub fn within(&self, start: u32, end: u32) -> ExpectationSet {
        ExpectationSet {
            by_line: self
                .by_line
                .range(start..=end)
                .map(|(line, exps)| (*line, exps.clone()))
                .collect(),
        }
    }
}

/// Parse `^` markers and return (target_line, remaining_text).
fn parse_line_offset(text: &str, current_line: u32) -> Option<(u32, &str)> {
    let carets = text.chars().take_while(|&c| c == '^').count();
    let target = current_line.checked_sub(carets as u32)?;
    Some((target, &text[carets..]))
}

/// Parse the content of an expectation comment: `kind[: name], ...`.
fn parse_expectation_content(text: &str, line: u32) -> Result<Vec<Expectation>, ParseError> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_single_expectation(part, line))
        .collect()
}

fn parse_single_expectation(text: &str, line: u32) -> Result<Expectation, ParseError> {
    let (kind_text, name) = match text.split_once(':') {
        Some((kind, name)) => (kind.trim(), Some(name.trim())),
        None => (text, None),
    };
    let kind = parse_kind(kind_text).ok_or_else(|| ParseError::UnknownKind {
        line,
        kind: kind_text.to_string(),
    })?;

    let name = match name {
        Some("") => {
            return Err(ParseError::MissingName {
                line,
                kind: kind_text.to_string(),
            })
        }
        Some(_) if kind == DiagnosticKind::UnreleasedAnonymous => {
            return Err(ParseError::UnexpectedName {
                line,
                text: text.to_string(),
            })
        }
        other => other.map(str::to_string),
    };

    Ok(Expectation {
        kind,
        name,
        line,
        raw: text.to_string(),
    })
}

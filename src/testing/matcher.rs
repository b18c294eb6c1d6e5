//! Matching logic for comparing reported diagnostics with expectations.

use crate::analysis::{Diagnostic, DiagnosticKind};
use super::expectation::Expectation;

/// Outcome of matching one line's expectations against its diagnostics.
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// Expectation matched
    Match,
    /// Expected diagnostic was not reported
    Missing { expected: Expectation },
    /// Diagnostic reported without a matching expectation
    Unexpected {
        kind: DiagnosticKind,
        name: Option<String>,
        type_name: String,
    },
}

impl MatchResult {
    /// Returns true if this is a match.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// Pair expectations with diagnostics on the same line.
///
/// Named expectations claim diagnostics first so a wildcard cannot steal
/// the only diagnostic a named expectation would accept. Returns only the
/// failures; an empty result means the line matched exactly.
pub fn match_line(expectations: &[Expectation], actual: &[&Diagnostic]) -> Vec<MatchResult> {
    let mut claimed = vec![false; actual.len()];
    let mut results = Vec::new();

    let (named, wildcards): (Vec<&Expectation>, Vec<&Expectation>) =
        expectations.iter().partition(|exp| exp.name.is_some());

    for exp in named.into_iter().chain(wildcards) {
        let found = actual.iter().enumerate().position(|(i, diagnostic)| {
            !claimed[i] && exp.accepts(diagnostic.kind, diagnostic.variable_name.as_deref())
        });
        match found {
            Some(i) => claimed[i] = true,
            None => results.push(MatchResult::Missing {
                expected: exp.clone(),
            }),
        }
    }

    for (diagnostic, _) in actual.iter().zip(&claimed).filter(|(_, taken)| !**taken) {
        results.push(MatchResult::Unexpected {
            kind: diagnostic.kind,
            name: diagnostic.variable_name.clone(),
            type_name: diagnostic.type_name.clone(),
        });
    }

    results
}

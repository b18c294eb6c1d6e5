//! Core types for the renderer framework.

use std::fmt;
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Rustc-style report with source snippets and underlines
    #[default]
    Diagnostic,
    /// Machine-readable JSON document
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "diagnostic" | "diag" | "human" => Some(Self::Diagnostic),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn all() -> &'static [(&'static str, &'static str)] {
        &[
            ("diagnostic", "Rustc-style with source lines and underlines"),
            ("json", "JSON document with every diagnostic"),
        ]
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let names: Vec<&str> = Self::all().iter().map(|(name, _)| *name).collect();
            format!("unknown format `{}`, expected one of: {}", s, names.join(", "))
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Diagnostic => "diagnostic",
            Self::Json => "json",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("diag"), Some(OutputFormat::Diagnostic));
        assert_eq!(OutputFormat::parse("html"), None);
        assert!("html".parse::<OutputFormat>().unwrap_err().contains("diagnostic, json"));
    }
}

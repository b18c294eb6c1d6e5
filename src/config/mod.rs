//! Analyzer configuration.
//!
//! Configuration is TOML. A built-in default (`default.toml`, embedded at
//! compile time) describes the framework: disposal contracts, release
//! methods, ownership-transferring APIs, wrapping stream types and the
//! catalog of well-known external types. A user file extends it unless it
//! sets `extend_defaults = false`.
//!
//! ```toml
//! analysis_severity = "medium"
//!
//! [[ownership_transfer]]
//! type = "MyApp.ResourceBag"
//! methods = ["Track(System.IDisposable)"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::analysis::Severity;

const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// Error when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid method signature `{0}`")]
    Signature(String),
}

/// Severity profile, mapped onto diagnostic severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSeverity {
    #[default]
    Default,
    Strict,
    Medium,
    Low,
    Informative,
}

impl AnalysisSeverity {
    pub fn severity(self) -> Severity {
        match self {
            AnalysisSeverity::Strict => Severity::Error,
            AnalysisSeverity::Medium => Severity::Warning,
            AnalysisSeverity::Default | AnalysisSeverity::Low | AnalysisSeverity::Informative => {
                Severity::Info
            }
        }
    }
}

/// Methods of one type, written as `Name` or `Name(Param.Type, ...)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodRule {
    #[serde(rename = "type")]
    pub type_name: String,
    pub methods: Vec<String>,
}

/// A `leaveOpen`-style constructor parameter that opts out of ownership.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaveOpen {
    pub name: String,
    pub index: usize,
}

/// A type whose constructor takes ownership of a resource argument.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingTypeRule {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub leave_open: Option<LeaveOpen>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownKind {
    #[default]
    Class,
    Struct,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownMemberKind {
    #[default]
    Method,
    Property,
    Field,
}

/// Member of a catalog type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnownMember {
    pub name: String,
    #[serde(default)]
    pub kind: KnownMemberKind,
    /// Result type; absent for `void`.
    #[serde(default)]
    pub returns: Option<String>,
    /// Parameter types; absent means any arity.
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// First parameter is the `this` receiver.
    #[serde(default)]
    pub extension: bool,
    /// Result is the n-th explicit generic argument (`A.Fake<T>()`).
    #[serde(default)]
    pub returns_type_argument: Option<usize>,
}

/// External type the source never declares.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnownType {
    /// Fully-qualified name, generic parameters included: `Task<TResult>`.
    pub name: String,
    #[serde(default)]
    pub kind: KnownKind,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub members: Vec<KnownMember>,
}

/// Complete analyzer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Merge with the built-in defaults (true when absent).
    pub extend_defaults: Option<bool>,
    pub diagnostic_id: Option<String>,
    pub analysis_severity: Option<AnalysisSeverity>,
    /// Interfaces marking a type as holding a resource.
    pub disposal_contracts: Vec<String>,
    /// Method names that release the receiver.
    pub release_methods: Vec<String>,
    /// Methods where a type releases its fields and properties.
    pub release_designated_methods: Vec<String>,
    /// Types and interfaces whose instances are never reported.
    pub ignored_types: Vec<String>,
    /// Namespaces imported into every file.
    pub implicit_usings: Vec<String>,
    pub ownership_transfer: Vec<MethodRule>,
    pub release_equivalent: Vec<MethodRule>,
    pub ignored_factory: Vec<MethodRule>,
    pub tracking_type: Vec<TrackingTypeRule>,
    pub known_type: Vec<KnownType>,
}

impl Config {
    /// The built-in configuration.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG, "built-in defaults")
    }

    /// Parse configuration text; `origin` names it in errors.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    /// Read a user file and combine it with the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let user = Self::from_toml(&text, &path.display().to_string())?;
        tracing::debug!("loaded configuration from {}", path.display());
        Self::defaults().map(|defaults| defaults.extend(user))
    }

    /// Defaults, or defaults plus a user file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::defaults(),
        }
    }

    /// Layer `other` over `self`: lists concatenate, scalars override.
    /// With `extend_defaults = false` in `other`, `self` is discarded.
    pub fn extend(self, other: Config) -> Config {
        if other.extend_defaults == Some(false) {
            return other;
        }
        let mut merged = self;
        merged.diagnostic_id = other.diagnostic_id.or(merged.diagnostic_id);
        merged.analysis_severity = other.analysis_severity.or(merged.analysis_severity);
        merged.disposal_contracts.extend(other.disposal_contracts);
        merged.release_methods.extend(other.release_methods);
        merged.release_designated_methods.extend(other.release_designated_methods);
        merged.ignored_types.extend(other.ignored_types);
        merged.implicit_usings.extend(other.implicit_usings);
        merged.ownership_transfer.extend(other.ownership_transfer);
        merged.release_equivalent.extend(other.release_equivalent);
        merged.ignored_factory.extend(other.ignored_factory);
        merged.tracking_type.extend(other.tracking_type);
        merged.known_type.extend(other.known_type);
        merged
    }

    pub fn severity(&self) -> Severity {
        self.analysis_severity.unwrap_or_default().severity()
    }
}

//! Read-only lookup tables shared by every analysis.

use std::collections::HashSet;

use super::reporter::Severity;
use crate::config::{Config, ConfigError, LeaveOpen, MethodRule};
use crate::semantic::{predefined, Catalog, SemanticModel, Symbol, TypeSymbol};
use crate::syntax::SourceFile;

const DEFAULT_DIAGNOSTIC_ID: &str = "DISP001";

/// `Name` or `Name(Param.Type, ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPattern {
    name: String,
    /// `None` matches any overload.
    parameters: Option<Vec<String>>,
}

impl MethodPattern {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let text = text.trim();
        let invalid = || ConfigError::Signature(text.to_string());
        let Some((name, rest)) = text.split_once('(') else {
            if text.is_empty() || text.contains(')') {
                return Err(invalid());
            }
            return Ok(Self {
                name: text.to_string(),
                parameters: None,
            });
        };
        let list = rest.strip_suffix(')').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        let parameters = if list.trim().is_empty() {
            Vec::new()
        } else {
            list.split(',')
                .map(|p| {
                    let p = p.trim();
                    predefined(p).unwrap_or(p).to_string()
                })
                .collect()
        };
        Ok(Self {
            name: name.to_string(),
            parameters: Some(parameters),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, symbol: &Symbol) -> bool {
        symbol.name == self.name
            && self
                .parameters
                .as_ref()
                .map_or(true, |params| *params == symbol.parameters)
    }
}

/// Method patterns attached to one type.
#[derive(Debug, Clone)]
pub struct TypeRule {
    pub type_name: String,
    pub methods: Vec<MethodPattern>,
}

impl TypeRule {
    fn from_config(rule: &MethodRule) -> Result<Self, ConfigError> {
        Ok(Self {
            type_name: rule.type_name.clone(),
            methods: rule
                .methods
                .iter()
                .map(|m| MethodPattern::parse(m))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Whether a resolved method belongs to this rule: declared on the rule
    /// type or a subtype of it, with a matching name and signature.
    pub fn matches(&self, symbol: &Symbol) -> bool {
        symbol
            .containing_type
            .as_ref()
            .is_some_and(|owner| owner.implements(&self.type_name))
            && self.methods.iter().any(|m| m.matches(symbol))
    }
}

/// Constructor-ownership rule.
#[derive(Debug, Clone)]
pub struct TrackingType {
    pub type_name: String,
    pub leave_open: Option<LeaveOpen>,
}

/// Configuration compiled into lookup tables.
///
/// Built once, then shared by reference across files and threads.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    diagnostic_id: String,
    severity: Severity,
    disposal_contracts: Vec<String>,
    release_methods: HashSet<String>,
    release_designated: HashSet<String>,
    ignored_types: Vec<String>,
    ownership_transfer: Vec<TypeRule>,
    release_equivalent: Vec<TypeRule>,
    ignored_factories: Vec<TypeRule>,
    tracking_types: Vec<TrackingType>,
    catalog: Catalog,
}

impl AnalysisContext {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let rules = |rules: &[MethodRule]| {
            rules
                .iter()
                .map(TypeRule::from_config)
                .collect::<Result<Vec<_>, _>>()
        };
        let context = Self {
            diagnostic_id: config
                .diagnostic_id
                .clone()
                .unwrap_or_else(|| DEFAULT_DIAGNOSTIC_ID.to_string()),
            severity: config.severity(),
            disposal_contracts: config.disposal_contracts.clone(),
            release_methods: config.release_methods.iter().cloned().collect(),
            release_designated: config.release_designated_methods.iter().cloned().collect(),
            ignored_types: config.ignored_types.clone(),
            ownership_transfer: rules(&config.ownership_transfer)?,
            release_equivalent: rules(&config.release_equivalent)?,
            ignored_factories: rules(&config.ignored_factory)?,
            tracking_types: config
                .tracking_type
                .iter()
                .map(|t| TrackingType {
                    type_name: t.type_name.clone(),
                    leave_open: t.leave_open.clone(),
                })
                .collect(),
            catalog: Catalog::from_config(config),
        };
        tracing::debug!(
            "analysis context: {} transfer rules, {} tracking types, {} catalog types",
            context.ownership_transfer.len(),
            context.tracking_types.len(),
            context.catalog.len()
        );
        Ok(context)
    }

    /// Context for the built-in configuration.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(&Config::defaults()?)
    }

    pub fn diagnostic_id(&self) -> &str {
        &self.diagnostic_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn disposal_contracts(&self) -> &[String] {
        &self.disposal_contracts
    }

    pub fn ignored_types(&self) -> &[String] {
        &self.ignored_types
    }

    pub fn is_release_method(&self, name: &str) -> bool {
        self.release_methods.contains(name)
    }

    pub fn is_release_designated(&self, name: &str) -> bool {
        self.release_designated.contains(name)
    }

    pub fn ownership_transfer(&self) -> &[TypeRule] {
        &self.ownership_transfer
    }

    pub fn release_equivalent(&self) -> &[TypeRule] {
        &self.release_equivalent
    }

    pub fn ignored_factories(&self) -> &[TypeRule] {
        &self.ignored_factories
    }

    /// Tracking rule for a constructed type, matched through its supertypes.
    pub fn tracking_type(&self, ty: &TypeSymbol) -> Option<&TrackingType> {
        self.tracking_types
            .iter()
            .find(|rule| ty.implements(&rule.type_name))
    }
}

/// Everything one node analysis reads: the file, its resolver and the
/// shared context.
#[derive(Clone, Copy)]
pub struct Cx<'a> {
    pub file: &'a SourceFile,
    pub model: &'a dyn SemanticModel,
    pub context: &'a AnalysisContext,
}

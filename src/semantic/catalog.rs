//! External types the analyzed source never declares.
//!
//! Framework and library types (`System.IO.Stream`, `HttpClient`, ...) come
//! from the `known_type` tables of the configuration. They are converted to
//! declarations once per analysis context and copied into every
//! compilation's index.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::index::{type_key, MemberDecl, MemberKind, NameScope, ParamDecl, TypeDecl};
use super::types::TypeRef;
use super::TypeKind;
use crate::config::{Config, KnownKind, KnownMember, KnownMemberKind, KnownType};

/// Catalogued declarations plus the implicitly imported namespaces.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    decls: Vec<TypeDecl>,
    implicit_usings: Vec<String>,
}

impl Catalog {
    pub fn from_config(config: &Config) -> Self {
        let decls = config
            .known_type
            .iter()
            .filter_map(|known| {
                let decl = declaration(known);
                if decl.is_none() {
                    tracing::warn!("ignoring catalog entry with unparsable name `{}`", known.name);
                }
                decl
            })
            .collect::<Vec<_>>();
        tracing::debug!("catalog holds {} external types", decls.len());
        Self {
            decls,
            implicit_usings: config.implicit_usings.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub(crate) fn decls(&self) -> &[TypeDecl] {
        &self.decls
    }

    pub(crate) fn implicit_usings(&self) -> &[String] {
        &self.implicit_usings
    }
}

fn parse_logged(text: &str) -> Option<TypeRef> {
    let parsed = TypeRef::parse(text);
    if parsed.is_none() {
        tracing::warn!("ignoring unparsable catalog type `{}`", text);
    }
    parsed
}

fn declaration(known: &KnownType) -> Option<TypeDecl> {
    let written = TypeRef::parse(&known.name)?;
    let type_params: Vec<String> = written.args.iter().map(|arg| arg.name.clone()).collect();
    let key = type_key(&written.name, type_params.len());
    let namespace = written
        .name
        .rsplit_once('.')
        .map_or("", |(namespace, _)| namespace)
        .to_string();

    Some(TypeDecl {
        full_name: written.name.clone(),
        kind: match known.kind {
            KnownKind::Class => TypeKind::Class,
            KnownKind::Struct => TypeKind::Struct,
            KnownKind::Interface => TypeKind::Interface,
        },
        bases: known.bases.iter().filter_map(|b| parse_logged(b)).collect(),
        scope: NameScope {
            namespace,
            enclosing_types: vec![key.clone()],
            type_params: type_params.clone(),
            usings: Arc::default(),
        },
        members: known.members.iter().map(member).collect(),
        key,
        type_params,
        base_keys: Vec::new(),
        supertypes: BTreeSet::new(),
    })
}

fn member(known: &KnownMember) -> MemberDecl {
    MemberDecl {
        kind: match known.kind {
            KnownMemberKind::Method => MemberKind::Method,
            KnownMemberKind::Property => MemberKind::Property,
            KnownMemberKind::Field => MemberKind::Field,
        },
        name: known.name.clone(),
        ty: known.returns.as_deref().and_then(parse_logged),
        type_params: Vec::new(),
        params: known.parameters.as_ref().map(|params| {
            params
                .iter()
                .map(|ty| ParamDecl {
                    ty: parse_logged(ty),
                    optional: false,
                    is_params: false,
                })
                .collect()
        }),
        is_static: known.is_static,
        is_extension: known.extension,
        returns_type_argument: known.returns_type_argument,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let config = Config::defaults().unwrap();
        let catalog = Catalog::from_config(&config);
        assert_eq!(catalog.len(), config.known_type.len());
        let task = catalog
            .decls()
            .iter()
            .find(|d| d.key == "System.Threading.Tasks.Task`1")
            .expect("generic Task is catalogued");
        assert_eq!(task.type_params, vec!["TResult".to_string()]);
        assert_eq!(task.scope.namespace, "System.Threading.Tasks");
    }

    #[test]
    fn test_members_convert() {
        let config = Config::from_toml(
            r#"
[[known_type]]
name = "Lib.Factory"
members = [
  { name = "Make", returns = "Lib.Widget", static = true, parameters = ["System.String"] },
  { name = "Current", kind = "property", returns = "Lib.Widget" },
]
"#,
            "test",
        )
        .unwrap();
        let catalog = Catalog::from_config(&config);
        let factory = &catalog.decls()[0];
        let make = &factory.members[0];
        assert!(make.is_static);
        assert_eq!(make.params.as_ref().map(Vec::len), Some(1));
        assert_eq!(factory.members[1].kind, MemberKind::Property);
        assert!(factory.members[1].params.is_none());
    }
}

//! Declaration index: every type a compilation can name.
//!
//! Source declarations and catalog entries land in the same table, keyed by
//! fully-qualified name plus generic arity (`System.Threading.Tasks.Task`1`).
//! Name lookup follows C# scoping closely enough for resolution of types
//! written in member signatures and expressions: nested types, the
//! namespace chain, using aliases, then using directives.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tree_sitter::Node;

use super::types::{predefined, TypeRef};
use super::{TypeKind, TypeSymbol};
use crate::syntax::kinds::*;
use crate::syntax::{children, named_children, nav, SourceFile};

/// Generic parameter bindings, by parameter name.
pub(crate) type Substitution = HashMap<String, TypeSymbol>;

/// Table key of a type.
pub(crate) fn type_key(full_name: &str, arity: usize) -> String {
    if arity == 0 {
        full_name.to_string()
    } else {
        format!("{}`{}", full_name, arity)
    }
}

fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Using directives in effect at some point of a file.
#[derive(Debug, Clone, Default)]
pub(crate) struct Usings {
    pub namespaces: Vec<String>,
    /// `using IO = System.IO;` maps `IO` to `System.IO`.
    pub aliases: HashMap<String, String>,
    /// `using static System.IO.File;`
    pub static_types: Vec<String>,
}

impl Usings {
    /// Add one `using` directive given its source text.
    pub fn add_directive(&mut self, text: &str) {
        let text = text.trim().trim_end_matches(';').trim();
        let text = text.strip_prefix("global ").map_or(text, str::trim_start);
        let Some(rest) = text.strip_prefix("using") else { return };
        let rest = rest.trim();
        if let Some(target) = rest.strip_prefix("static ") {
            self.static_types.push(target.trim().to_string());
        } else if let Some((alias, target)) = rest.split_once('=') {
            self.aliases
                .insert(alias.trim().to_string(), target.trim().to_string());
        } else if !rest.is_empty() {
            self.namespaces.push(rest.to_string());
        }
    }

    /// Add every `using_directive` that is a direct child of `container`.
    pub fn add_children_of(&mut self, file: &SourceFile, container: Node<'_>) {
        for child in named_children(container) {
            if child.kind() == USING_DIRECTIVE {
                self.add_directive(file.node_text(child));
            }
        }
    }
}

/// Where a name is being looked up from.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameScope {
    pub namespace: String,
    /// Keys of enclosing type declarations, outermost first.
    pub enclosing_types: Vec<String>,
    /// Generic parameters visible here.
    pub type_params: Vec<String>,
    pub usings: Arc<Usings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberKind {
    Method,
    Constructor,
    Field,
    Property,
}

#[derive(Debug, Clone)]
pub(crate) struct ParamDecl {
    pub ty: Option<TypeRef>,
    /// Has a default value.
    pub optional: bool,
    /// `params` array: zero or more trailing arguments.
    pub is_params: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct MemberDecl {
    pub kind: MemberKind,
    pub name: String,
    /// Field or property type, method result; `None` for `void`.
    pub ty: Option<TypeRef>,
    pub type_params: Vec<String>,
    /// `None` when the arity is unknown (catalog entries without parameters).
    pub params: Option<Vec<ParamDecl>>,
    pub is_static: bool,
    pub is_extension: bool,
    pub returns_type_argument: Option<usize>,
}

impl MemberDecl {
    /// Whether a call with `count` arguments can bind to this member.
    pub fn accepts(&self, count: usize) -> bool {
        let Some(params) = &self.params else { return true };
        let required = params.iter().filter(|p| !p.optional && !p.is_params).count();
        let has_params_array = params.last().is_some_and(|p| p.is_params);
        count >= required && (count <= params.len() || has_params_array)
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, MemberKind::Field | MemberKind::Property)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TypeDecl {
    pub full_name: String,
    pub key: String,
    pub kind: TypeKind,
    pub type_params: Vec<String>,
    pub bases: Vec<TypeRef>,
    /// Scope member and base types are resolved in.
    pub scope: NameScope,
    pub members: Vec<MemberDecl>,
    /// Filled by [`DeclarationIndex::finalize`].
    pub base_keys: Vec<String>,
    pub supertypes: BTreeSet<String>,
}

/// All declared and catalogued types of one compilation.
#[derive(Debug, Default)]
pub(crate) struct DeclarationIndex {
    types: HashMap<String, TypeDecl>,
    /// Extension methods by name: (declaring type key, member index).
    extensions: HashMap<String, Vec<(String, usize)>>,
    implicit_usings: Vec<String>,
}

impl DeclarationIndex {
    pub fn new(implicit_usings: Vec<String>) -> Self {
        Self {
            implicit_usings,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&TypeDecl> {
        self.types.get(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Register a type; partial declarations merge into one entry.
    pub fn insert(&mut self, decl: TypeDecl) {
        let key = decl.key.clone();
        let first_member = match self.types.get_mut(&key) {
            Some(existing) => {
                let offset = existing.members.len();
                existing.bases.extend(decl.bases);
                existing.members.extend(decl.members);
                offset
            }
            None => {
                self.types.insert(key.clone(), decl);
                0
            }
        };
        if let Some(decl) = self.types.get(&key) {
            for (index, member) in decl.members.iter().enumerate().skip(first_member) {
                if member.is_extension {
                    self.extensions
                        .entry(member.name.clone())
                        .or_default()
                        .push((key.clone(), index));
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Source declarations
    // ------------------------------------------------------------------------

    /// Index every type declared in a file.
    pub fn add_source(&mut self, file: &SourceFile) {
        let root = file.root();
        let mut usings = Usings::default();
        usings.add_children_of(file, root);
        let mut namespace = String::new();
        for child in named_children(root) {
            if child.kind() == FILE_SCOPED_NAMESPACE_DECLARATION {
                if let Some(name) = nav::declaration_name(child) {
                    namespace = file.node_text(name).to_string();
                }
                usings.add_children_of(file, child);
            }
        }
        self.collect_container(file, root, &namespace, &[], &Arc::new(usings));
    }

    fn collect_container(
        &mut self,
        file: &SourceFile,
        container: Node<'_>,
        namespace: &str,
        outer: &[String],
        usings: &Arc<Usings>,
    ) {
        for child in named_children(container) {
            match child.kind() {
                NAMESPACE_DECLARATION => {
                    let (Some(name), Some(body)) = (nav::declaration_name(child), nav::type_body(child))
                    else {
                        continue;
                    };
                    let inner_namespace = join(namespace, file.node_text(name));
                    let mut inner_usings = (**usings).clone();
                    inner_usings.add_children_of(file, body);
                    self.collect_container(file, body, &inner_namespace, outer, &Arc::new(inner_usings));
                }
                FILE_SCOPED_NAMESPACE_DECLARATION => {
                    self.collect_container(file, child, namespace, outer, usings);
                }
                kind if is_type_declaration(kind) => {
                    self.add_type(file, child, namespace, outer, usings);
                }
                _ => {}
            }
        }
    }

    fn add_type(
        &mut self,
        file: &SourceFile,
        node: Node<'_>,
        namespace: &str,
        outer: &[String],
        usings: &Arc<Usings>,
    ) {
        let Some(name) = nav::declaration_name(node) else { return };
        let name = file.node_text(name);
        let own_params = type_parameters(file, node);

        let full_name = match outer.last().and_then(|key| self.types.get(key)) {
            Some(parent) => format!("{}.{}", parent.full_name, name),
            None => join(namespace, name),
        };
        let key = type_key(&full_name, own_params.len());

        let mut enclosing = outer.to_vec();
        enclosing.push(key.clone());
        let mut type_params: Vec<String> = outer
            .iter()
            .filter_map(|k| self.types.get(k))
            .flat_map(|d| d.type_params.iter().cloned())
            .collect();
        type_params.extend(own_params.iter().cloned());

        let kind = match node.kind() {
            INTERFACE_DECLARATION => TypeKind::Interface,
            STRUCT_DECLARATION | RECORD_STRUCT_DECLARATION => TypeKind::Struct,
            _ => TypeKind::Class,
        };

        let body = nav::type_body(node);
        let members = body
            .map(|body| collect_members(file, body))
            .unwrap_or_default();

        self.insert(TypeDecl {
            full_name,
            key,
            kind,
            type_params: own_params,
            bases: base_types(file, node),
            scope: NameScope {
                namespace: namespace.to_string(),
                enclosing_types: enclosing.clone(),
                type_params,
                usings: Arc::clone(usings),
            },
            members,
            base_keys: Vec::new(),
            supertypes: BTreeSet::new(),
        });

        if let Some(body) = body {
            self.collect_container(file, body, namespace, &enclosing, usings);
        }
    }

    // ------------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------------

    /// Resolve base lists and compute transitive supertypes.
    pub fn finalize(&mut self) {
        let base_keys: HashMap<String, Vec<String>> = self
            .types
            .values()
            .map(|decl| {
                let keys = decl
                    .bases
                    .iter()
                    .filter_map(|base| self.lookup_key(&base.name, base.arity(), &decl.scope))
                    .filter(|key| key != &decl.key)
                    .collect();
                (decl.key.clone(), keys)
            })
            .collect();

        let mut supertypes: HashMap<String, BTreeSet<String>> = HashMap::new();
        for key in base_keys.keys() {
            let mut seen = HashSet::new();
            let mut names = BTreeSet::new();
            let mut queue: VecDeque<&String> = base_keys[key].iter().collect();
            while let Some(base) = queue.pop_front() {
                if !seen.insert(base.clone()) {
                    continue;
                }
                if let Some(decl) = self.types.get(base) {
                    names.insert(decl.full_name.clone());
                }
                if let Some(next) = base_keys.get(base) {
                    queue.extend(next.iter());
                }
            }
            supertypes.insert(key.clone(), names);
        }

        for (key, decl) in self.types.iter_mut() {
            decl.base_keys = base_keys.get(key).cloned().unwrap_or_default();
            decl.supertypes = supertypes.remove(key).unwrap_or_default();
        }
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Find the table key for a written name.
    pub fn lookup_key(&self, name: &str, arity: usize, scope: &NameScope) -> Option<String> {
        let candidate = |full: String| {
            let key = type_key(&full, arity);
            self.types.contains_key(&key).then_some(key)
        };

        for outer in scope.enclosing_types.iter().rev() {
            if let Some(decl) = self.types.get(outer) {
                if let Some(key) = candidate(format!("{}.{}", decl.full_name, name)) {
                    return Some(key);
                }
            }
        }

        let mut namespace = scope.namespace.as_str();
        loop {
            if let Some(key) = candidate(join(namespace, name)) {
                return Some(key);
            }
            if namespace.is_empty() {
                break;
            }
            namespace = namespace.rsplit_once('.').map_or("", |(parent, _)| parent);
        }

        let (head, tail) = match name.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (name, None),
        };
        if let Some(target) = scope.usings.aliases.get(head) {
            let target = TypeRef::parse(target).map_or_else(|| target.clone(), |t| t.name);
            let full = match tail {
                Some(tail) => format!("{}.{}", target, tail),
                None => target,
            };
            if let Some(key) = candidate(full) {
                return Some(key);
            }
        }

        scope
            .usings
            .namespaces
            .iter()
            .chain(self.implicit_usings.iter())
            .find_map(|namespace| candidate(join(namespace, name)))
    }

    /// Symbol for a table entry.
    pub fn symbol_for(&self, key: &str, type_arguments: Vec<TypeSymbol>) -> Option<TypeSymbol> {
        let decl = self.types.get(key)?;
        Some(TypeSymbol {
            full_name: decl.full_name.clone(),
            type_arguments,
            supertypes: decl.supertypes.clone(),
            kind: decl.kind,
        })
    }

    /// Resolve a written type.
    pub fn resolve(&self, tref: &TypeRef, scope: &NameScope, subst: &Substitution) -> Option<TypeSymbol> {
        if tref.array {
            return Some(TypeSymbol::new("System.Array", TypeKind::Class));
        }
        if tref.args.is_empty() {
            if let Some(bound) = subst.get(&tref.name) {
                return Some(bound.clone());
            }
            if scope.type_params.contains(&tref.name) {
                return Some(TypeSymbol::opaque(tref.name.clone()));
            }
        }
        if let Some(full) = predefined(&tref.name) {
            return Some(
                self.symbol_for(full, Vec::new())
                    .unwrap_or_else(|| TypeSymbol::opaque(full)),
            );
        }
        let key = self.lookup_key(&tref.name, tref.arity(), scope)?;
        let arguments = tref
            .args
            .iter()
            .map(|arg| {
                self.resolve(arg, scope, subst)
                    .unwrap_or_else(|| TypeSymbol::opaque(arg.to_string()))
            })
            .collect();
        self.symbol_for(&key, arguments)
    }

    /// Find a member by name on a type or its bases, preferring an overload
    /// that accepts `arg_count` arguments.
    pub fn find_member(
        &self,
        type_key: &str,
        name: &str,
        wanted: impl Fn(&MemberDecl) -> bool,
        arg_count: Option<usize>,
    ) -> Option<(&TypeDecl, &MemberDecl)> {
        let mut queue = VecDeque::from([type_key.to_string()]);
        let mut seen = HashSet::new();
        let mut fallback = None;
        while let Some(key) = queue.pop_front() {
            if !seen.insert(key.clone()) {
                continue;
            }
            let Some(decl) = self.types.get(&key) else { continue };
            for member in decl.members.iter().filter(|m| m.name == name && wanted(m)) {
                if arg_count.map_or(true, |count| member.accepts(count)) {
                    return Some((decl, member));
                }
                fallback.get_or_insert((decl, member));
            }
            queue.extend(decl.base_keys.iter().cloned());
        }
        fallback
    }

    /// Find an extension method applicable to a receiver.
    pub fn find_extension(
        &self,
        name: &str,
        receiver: &TypeSymbol,
        arg_count: usize,
    ) -> Option<(&TypeDecl, &MemberDecl)> {
        let mut fallback = None;
        for (key, index) in self.extensions.get(name)? {
            let Some(decl) = self.types.get(key) else { continue };
            let Some(member) = decl.members.get(*index) else { continue };
            let receiver_type = member
                .params
                .as_ref()
                .and_then(|params| params.first())
                .and_then(|param| param.ty.as_ref());
            let applies = match receiver_type {
                None => true,
                Some(t) if t.args.is_empty() && member.type_params.contains(&t.name) => true,
                Some(t) if predefined(&t.name).unwrap_or(&t.name) == "System.Object" => true,
                Some(t) => self
                    .resolve(t, &decl.scope, &Substitution::new())
                    .is_some_and(|param| receiver.implements(&param.full_name)),
            };
            if !applies {
                continue;
            }
            if member.accepts(arg_count + 1) {
                return Some((decl, member));
            }
            fallback.get_or_insert((decl, member));
        }
        fallback
    }
}

// ============================================================================
// Declaration extraction
// ============================================================================

/// Generic parameter names of a type, method or local function.
pub(crate) fn type_parameters(file: &SourceFile, node: Node<'_>) -> Vec<String> {
    let list = node.child_by_field_name("type_parameters").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == TYPE_PARAMETER_LIST)
    });
    let Some(list) = list else { return Vec::new() };
    named_children(list)
        .into_iter()
        .filter(|child| child.kind() == TYPE_PARAMETER)
        .map(|param| {
            nav::declaration_name(param)
                .map_or_else(|| file.node_text(param), |name| file.node_text(name))
                .to_string()
        })
        .collect()
}

fn base_types(file: &SourceFile, node: Node<'_>) -> Vec<TypeRef> {
    let Some(list) = named_children(node)
        .into_iter()
        .find(|child| child.kind() == BASE_LIST)
    else {
        return Vec::new();
    };
    named_children(list)
        .into_iter()
        .filter_map(|base| {
            let text = file.node_text(base);
            // Record primary constructor bases carry arguments: `Base(x)`
            let text = text.split_once('(').map_or(text, |(head, _)| head);
            TypeRef::parse(text)
        })
        .collect()
}

fn written_type(file: &SourceFile, node: Option<Node<'_>>) -> Option<TypeRef> {
    let tref = TypeRef::parse(file.node_text(node?))?;
    (tref.name != "void").then_some(tref)
}

/// Parameters of a method, constructor, local function or lambda.
pub(crate) fn parameters(file: &SourceFile, node: Node<'_>) -> Vec<ParamDecl> {
    let list = node.child_by_field_name("parameters").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == PARAMETER_LIST)
    });
    let Some(list) = list else { return Vec::new() };

    let mut params = Vec::new();
    let mut after_params_keyword = false;
    for child in children(list) {
        if child.kind() == PARAMETER {
            let has_default = children(child)
                .iter()
                .any(|t| t.kind() == "=" || t.kind() == EQUALS_VALUE_CLAUSE);
            params.push(ParamDecl {
                ty: written_type(file, nav::declared_type(child)),
                optional: has_default,
                is_params: nav::has_modifier(file, child, "params"),
            });
        } else if !child.is_named() && child.kind() == "params" {
            // Inline `params T[] rest`: the keyword, type and name sit in the list
            after_params_keyword = true;
        } else if after_params_keyword && child.is_named() && child.kind() != IDENTIFIER {
            after_params_keyword = false;
            params.push(ParamDecl {
                ty: TypeRef::parse(file.node_text(child)),
                optional: false,
                is_params: true,
            });
        }
    }
    params
}

/// Whether the first parameter carries the `this` modifier.
fn is_extension_method(file: &SourceFile, node: Node<'_>) -> bool {
    let list = node.child_by_field_name("parameters").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == PARAMETER_LIST)
    });
    let Some(first) = list.and_then(|list| {
        named_children(list)
            .into_iter()
            .find(|child| child.kind() == PARAMETER)
    }) else {
        return false;
    };
    let type_start = nav::declared_type(first).map_or(first.end_byte(), |t| t.start_byte());
    children(first)
        .into_iter()
        .filter(|child| child.end_byte() <= type_start)
        .any(|child| file.node_text(child) == "this")
}

fn collect_members(file: &SourceFile, body: Node<'_>) -> Vec<MemberDecl> {
    let mut members = Vec::new();
    for child in named_children(body) {
        let is_static = nav::has_modifier(file, child, "static");
        match child.kind() {
            FIELD_DECLARATION | EVENT_FIELD_DECLARATION => {
                let Some(declaration) = named_children(child)
                    .into_iter()
                    .find(|c| c.kind() == VARIABLE_DECLARATION)
                else {
                    continue;
                };
                let ty = written_type(file, nav::declared_type(declaration));
                for declarator in named_children(declaration)
                    .into_iter()
                    .filter(|c| c.kind() == VARIABLE_DECLARATOR)
                {
                    let Some(name) = nav::declarator_name(declarator) else { continue };
                    members.push(MemberDecl {
                        kind: MemberKind::Field,
                        name: file.node_text(name).to_string(),
                        ty: ty.clone(),
                        type_params: Vec::new(),
                        params: None,
                        is_static,
                        is_extension: false,
                        returns_type_argument: None,
                    });
                }
            }
            PROPERTY_DECLARATION => {
                let Some(name) = nav::declaration_name(child) else { continue };
                members.push(MemberDecl {
                    kind: MemberKind::Property,
                    name: file.node_text(name).to_string(),
                    ty: written_type(file, nav::declared_type(child)),
                    type_params: Vec::new(),
                    params: None,
                    is_static,
                    is_extension: false,
                    returns_type_argument: None,
                });
            }
            METHOD_DECLARATION => {
                let Some(name) = nav::declaration_name(child) else { continue };
                members.push(MemberDecl {
                    kind: MemberKind::Method,
                    name: file.node_text(name).to_string(),
                    ty: written_type(file, nav::declared_type(child)),
                    type_params: type_parameters(file, child),
                    params: Some(parameters(file, child)),
                    is_static,
                    is_extension: is_static && is_extension_method(file, child),
                    returns_type_argument: None,
                });
            }
            CONSTRUCTOR_DECLARATION => {
                let Some(name) = nav::declaration_name(child) else { continue };
                members.push(MemberDecl {
                    kind: MemberKind::Constructor,
                    name: file.node_text(name).to_string(),
                    ty: None,
                    type_params: Vec::new(),
                    params: Some(parameters(file, child)),
                    is_static,
                    is_extension: false,
                    returns_type_argument: None,
                });
            }
            _ => {}
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(sources: &[&str]) -> DeclarationIndex {
        let mut index = DeclarationIndex::new(Vec::new());
        for (i, source) in sources.iter().enumerate() {
            let file = SourceFile::parse(format!("f{}.cs", i), *source).unwrap();
            index.add_source(&file);
        }
        index.finalize();
        index
    }

    fn scope(namespace: &str, usings: &[&str]) -> NameScope {
        let mut u = Usings::default();
        for directive in usings {
            u.add_directive(directive);
        }
        NameScope {
            namespace: namespace.to_string(),
            usings: Arc::new(u),
            ..NameScope::default()
        }
    }

    #[test]
    fn test_using_directive_forms() {
        let mut usings = Usings::default();
        usings.add_directive("using System.IO;");
        usings.add_directive("global using static System.Math;");
        usings.add_directive("using IO = System.IO;");
        assert_eq!(usings.namespaces, vec!["System.IO".to_string()]);
        assert_eq!(usings.static_types, vec!["System.Math".to_string()]);
        assert_eq!(usings.aliases.get("IO").map(String::as_str), Some("System.IO"));
    }

    #[test]
    fn test_namespaced_and_nested_types() {
        let index = index_of(&["namespace App.Core { class Outer { class Inner { } } }"]);
        assert!(index.get("App.Core.Outer").is_some());
        assert!(index.get("App.Core.Outer.Inner").is_some());
    }

    #[test]
    fn test_file_scoped_namespace() {
        let index = index_of(&["namespace App;\nclass Widget { }\n"]);
        assert!(index.get("App.Widget").is_some());
    }

    #[test]
    fn test_lookup_through_usings_and_aliases() {
        let index = index_of(&["namespace Lib.Streams { class Pipe { } }"]);
        let via_using = scope("App", &["using Lib.Streams;"]);
        assert_eq!(index.lookup_key("Pipe", 0, &via_using).as_deref(), Some("Lib.Streams.Pipe"));

        let via_alias = scope("App", &["using P = Lib.Streams.Pipe;"]);
        assert_eq!(index.lookup_key("P", 0, &via_alias).as_deref(), Some("Lib.Streams.Pipe"));

        let none = scope("App", &[]);
        assert!(index.lookup_key("Pipe", 0, &none).is_none());
    }

    #[test]
    fn test_supertypes_are_transitive() {
        let index = index_of(&[r#"
namespace App {
    interface IResource { }
    class Base : IResource { }
    class Derived : Base { }
}
"#]);
        let derived = index.symbol_for("App.Derived", Vec::new()).unwrap();
        assert!(derived.implements("App.Base"));
        assert!(derived.implements("App.IResource"));
    }

    #[test]
    fn test_members_and_overloads() {
        let index = index_of(&[r#"
class Bag {
    private int _count;
    public string Name { get; set; }
    public void Track(object item) { }
    public void Track(object item, int weight) { }
    public static int Count() => 0;
}
"#]);
        let (_, one) = index.find_member("Bag", "Track", |_| true, Some(1)).unwrap();
        assert_eq!(one.params.as_ref().unwrap().len(), 1);
        let (_, two) = index.find_member("Bag", "Track", |_| true, Some(2)).unwrap();
        assert_eq!(two.params.as_ref().unwrap().len(), 2);
        let (_, name) = index.find_member("Bag", "Name", MemberDecl::is_value, None).unwrap();
        assert_eq!(name.kind, MemberKind::Property);
        let (_, field) = index.find_member("Bag", "_count", MemberDecl::is_value, None).unwrap();
        assert_eq!(field.kind, MemberKind::Field);
        let (_, count) = index.find_member("Bag", "Count", |_| true, Some(0)).unwrap();
        assert!(count.is_static);
    }

    #[test]
    fn test_extension_methods_are_indexed() {
        let index = index_of(&[r#"
static class Extensions {
    public static void Register(this object item, int order) { }
    public static void Plain(object item) { }
}
"#]);
        let receiver = TypeSymbol::opaque("Anything");
        assert!(index.find_extension("Register", &receiver, 1).is_some());
        assert!(index.find_extension("Plain", &receiver, 0).is_none());
    }

    #[test]
    fn test_optional_parameters_arity() {
        let index = index_of(&["class C { void M(int a, int b = 1) { } }"]);
        let (_, m) = index.find_member("C", "M", |_| true, None).unwrap();
        assert!(m.accepts(1));
        assert!(m.accepts(2));
        assert!(!m.accepts(3));
        assert!(!m.accepts(0));
    }

    #[test]
    fn test_params_array_arity() {
        let index = index_of(&["class C { void M(int a, params object[] rest) { } }"]);
        let (_, m) = index.find_member("C", "M", |_| true, None).unwrap();
        assert!(!m.accepts(0));
        assert!(m.accepts(1));
        assert!(m.accepts(2));
        assert!(m.accepts(5));
    }

    #[test]
    fn test_overload_with_default_does_not_take_extra_arguments() {
        let index = index_of(&[
            "class C { void M(int a, int b = 1) { } void M(int a, int b, int c, int d) { } }",
        ]);
        let (_, m) = index.find_member("C", "M", |_| true, Some(4)).unwrap();
        assert_eq!(m.params.as_ref().map(Vec::len), Some(4));
        let (_, m) = index.find_member("C", "M", |_| true, Some(2)).unwrap();
        assert_eq!(m.params.as_ref().map(Vec::len), Some(2));
    }
}

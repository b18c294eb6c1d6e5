//! [`SemanticModel`] over the declarations of a compilation.
//!
//! Expression typing covers what resource analysis needs: constructions,
//! calls (instance, static, extension, local function, generic), `await`
//! of task-like values, locals, parameters, fields, properties and the
//! transparent wrappers (`(x)`, casts, `as`, `??`, `?:`, `!`). Anything
//! else resolves to `None`.

use tree_sitter::Node;

use super::catalog::Catalog;
use super::index::{
    parameters, type_key, type_parameters, DeclarationIndex, MemberDecl, MemberKind, NameScope,
    Substitution, TypeDecl, Usings,
};
use super::types::TypeRef;
use super::{SemanticModel, Symbol, SymbolKind, TypeSymbol};
use crate::syntax::kinds::*;
use crate::syntax::{ancestors, named_children, nav, Descendants, SourceFile};

/// Guard against runaway inference through chains of `var` locals.
const MAX_DEPTH: usize = 32;

/// Task-like wrappers whose single type argument is the awaited result.
const AWAITABLES: &[&str] = &[
    "System.Threading.Tasks.Task",
    "System.Threading.Tasks.ValueTask",
    "System.Runtime.CompilerServices.ConfiguredTaskAwaitable",
    "System.Runtime.CompilerServices.ConfiguredValueTaskAwaitable",
];

/// Result of an `await` on a value of this type.
pub(crate) fn awaited_type(awaitable: &TypeSymbol) -> Option<TypeSymbol> {
    if !AWAITABLES.contains(&awaitable.full_name.as_str()) {
        return None;
    }
    match awaitable.type_arguments.as_slice() {
        [result] => Some(result.clone()),
        _ => None,
    }
}

/// What a simple name refers to.
enum Value<'a, 't> {
    /// A `variable_declarator`.
    Local(Node<'t>),
    Parameter(Node<'t>),
    /// Lambda parameter without a written type.
    Untyped,
    /// A `foreach_statement` whose iteration variable is the name.
    Foreach(Node<'t>),
    Member(&'a TypeDecl, &'a MemberDecl),
}

/// A call bound to its declaration.
struct ResolvedCall {
    symbol: Symbol,
    return_type: Option<TypeSymbol>,
}

/// Declarations of every file in a compilation plus the catalog.
#[derive(Debug)]
pub struct SourceModel {
    index: DeclarationIndex,
}

impl SourceModel {
    pub fn build(files: &[SourceFile], catalog: &Catalog) -> Self {
        let mut index = DeclarationIndex::new(catalog.implicit_usings().to_vec());
        for decl in catalog.decls() {
            index.insert(decl.clone());
        }
        for file in files {
            index.add_source(file);
        }
        index.finalize();
        tracing::debug!(
            "semantic model: {} files, {} types",
            files.len(),
            index.len()
        );
        Self { index }
    }

    // ------------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------------

    /// Namespace, enclosing types, generic parameters and usings at a node.
    fn scope_at(&self, file: &SourceFile, node: Node<'_>) -> NameScope {
        let mut usings = Usings::default();
        let mut namespaces: Vec<&str> = Vec::new();
        let mut types: Vec<(String, usize)> = Vec::new();
        let mut type_params = Vec::new();

        for ancestor in ancestors(node) {
            match ancestor.kind() {
                NAMESPACE_DECLARATION => {
                    if let Some(name) = nav::declaration_name(ancestor) {
                        namespaces.push(file.node_text(name));
                    }
                    if let Some(body) = nav::type_body(ancestor) {
                        usings.add_children_of(file, body);
                    }
                }
                COMPILATION_UNIT => {
                    usings.add_children_of(file, ancestor);
                    for child in named_children(ancestor) {
                        if child.kind() == FILE_SCOPED_NAMESPACE_DECLARATION {
                            if let Some(name) = nav::declaration_name(child) {
                                namespaces.push(file.node_text(name));
                            }
                            usings.add_children_of(file, child);
                        }
                    }
                }
                METHOD_DECLARATION | LOCAL_FUNCTION_STATEMENT => {
                    type_params.extend(type_parameters(file, ancestor));
                }
                kind if is_type_declaration(kind) => {
                    if let Some(name) = nav::declaration_name(ancestor) {
                        let params = type_parameters(file, ancestor);
                        types.push((file.node_text(name).to_string(), params.len()));
                        type_params.extend(params);
                    }
                }
                _ => {}
            }
        }

        let namespace = namespaces.iter().rev().copied().collect::<Vec<_>>().join(".");
        let mut enclosing_types = Vec::with_capacity(types.len());
        let mut outer_name = namespace.clone();
        for (name, arity) in types.iter().rev() {
            outer_name = if outer_name.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", outer_name, name)
            };
            enclosing_types.push(type_key(&outer_name, *arity));
        }

        NameScope {
            namespace,
            enclosing_types,
            type_params,
            usings: usings.into(),
        }
    }

    /// Resolve a type node as written at its position.
    fn resolve_type_node(&self, file: &SourceFile, type_node: Node<'_>) -> Option<TypeSymbol> {
        let written = TypeRef::parse(file.node_text(type_node))?;
        if written.is_implicit() {
            return None;
        }
        self.index
            .resolve(&written, &self.scope_at(file, type_node), &Substitution::new())
    }

    /// An expression naming a type (`File`, `System.IO.File`, `A.Fake`).
    fn type_expression(&self, file: &SourceFile, node: Node<'_>) -> Option<TypeSymbol> {
        match node.kind() {
            IDENTIFIER | QUALIFIED_NAME | GENERIC_NAME | ALIAS_QUALIFIED_NAME | PREDEFINED_TYPE
            | MEMBER_ACCESS_EXPRESSION => self.resolve_type_node(file, node),
            _ => None,
        }
    }

    fn enclosing_type_symbol(&self, file: &SourceFile, node: Node<'_>) -> Option<TypeSymbol> {
        let scope = self.scope_at(file, node);
        self.index.symbol_for(scope.enclosing_types.last()?, Vec::new())
    }

    // ------------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------------

    fn lookup_value<'t>(&self, file: &SourceFile, node: Node<'t>, name: &str) -> Option<Value<'_, 't>> {
        for ancestor in ancestors(node) {
            let kind = ancestor.kind();
            if kind == FOREACH_STATEMENT {
                let declares = ancestor
                    .child_by_field_name("left")
                    .is_some_and(|left| left.kind() == IDENTIFIER && file.node_text(left) == name);
                let in_body = ancestor
                    .child_by_field_name("body")
                    .is_some_and(|body| node.start_byte() >= body.start_byte());
                if declares && in_body {
                    return Some(Value::Foreach(ancestor));
                }
            }
            if is_scope(kind) || kind == COMPILATION_UNIT {
                if let Some(value) = find_parameter(file, ancestor, name) {
                    return Some(value);
                }
                if let Some(declarator) = find_local(file, ancestor, node, name) {
                    return Some(Value::Local(declarator));
                }
            }
            if is_type_declaration(kind) {
                break;
            }
        }

        let scope = self.scope_at(file, node);
        scope.enclosing_types.iter().rev().find_map(|key| {
            self.index
                .find_member(key, name, MemberDecl::is_value, None)
                .map(|(decl, member)| Value::Member(decl, member))
        })
    }

    fn value_type(
        &self,
        file: &SourceFile,
        value: &Value<'_, '_>,
        site: Node<'_>,
        depth: usize,
    ) -> Option<TypeSymbol> {
        match value {
            Value::Local(declarator) => {
                let declaration = declarator.parent()?;
                let type_node = nav::declared_type(declaration)?;
                if !TypeRef::parse(file.node_text(type_node))?.is_implicit() {
                    return self.resolve_type_node(file, type_node);
                }
                let initializer = nav::declarator_value(*declarator)?;
                if initializer.byte_range().contains(&site.start_byte()) {
                    return None;
                }
                self.type_at(file, initializer, depth)
            }
            Value::Parameter(parameter) => self.resolve_type_node(file, nav::declared_type(*parameter)?),
            Value::Untyped => None,
            Value::Foreach(statement) => {
                if let Some(type_node) = statement.child_by_field_name("type") {
                    if let Some(symbol) = self.resolve_type_node(file, type_node) {
                        return Some(symbol);
                    }
                }
                let collection = self.type_at(file, statement.child_by_field_name("right")?, depth)?;
                match collection.type_arguments.as_slice() {
                    [element] => Some(element.clone()),
                    _ => None,
                }
            }
            Value::Member(decl, member) => {
                self.index
                    .resolve(member.ty.as_ref()?, &decl.scope, &Substitution::new())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn type_at(&self, file: &SourceFile, node: Node<'_>, depth: usize) -> Option<TypeSymbol> {
        if depth > MAX_DEPTH {
            return None;
        }
        let depth = depth + 1;
        match node.kind() {
            OBJECT_CREATION_EXPRESSION => {
                let type_node = node
                    .child_by_field_name("type")
                    .or_else(|| named_children(node).into_iter().next())?;
                self.resolve_type_node(file, type_node)
            }
            IMPLICIT_OBJECT_CREATION_EXPRESSION => self.target_type(file, node, depth),
            INVOCATION_EXPRESSION => self.resolve_call(file, node, depth)?.return_type,
            AWAIT_EXPRESSION => awaited_type(&self.type_at(file, nav::operand(node)?, depth)?),
            PARENTHESIZED_EXPRESSION => self.type_at(file, nav::operand(node)?, depth),
            CAST_EXPRESSION => {
                let type_node = node
                    .child_by_field_name("type")
                    .or_else(|| named_children(node).into_iter().next())?;
                self.resolve_type_node(file, type_node)
            }
            AS_EXPRESSION => {
                let type_node = node
                    .child_by_field_name("right")
                    .or_else(|| named_children(node).into_iter().last())?;
                self.resolve_type_node(file, type_node)
            }
            BINARY_EXPRESSION => match nav::binary_operator(node) {
                Some("??") => {
                    let left = node
                        .child_by_field_name("left")
                        .or_else(|| named_children(node).into_iter().next())?;
                    self.type_at(file, left, depth)
                }
                Some("as") => {
                    let right = node
                        .child_by_field_name("right")
                        .or_else(|| named_children(node).into_iter().last())?;
                    self.resolve_type_node(file, right)
                }
                _ => None,
            },
            CONDITIONAL_EXPRESSION => {
                let branches = ["consequence", "alternative"];
                branches
                    .iter()
                    .filter_map(|field| node.child_by_field_name(field))
                    .find_map(|branch| self.type_at(file, branch, depth))
            }
            POSTFIX_UNARY_EXPRESSION if file.node_text(node).trim_end().ends_with('!') => {
                self.type_at(file, nav::operand(node)?, depth)
            }
            IDENTIFIER => {
                let value = self.lookup_value(file, node, file.node_text(node))?;
                self.value_type(file, &value, node, depth)
            }
            MEMBER_ACCESS_EXPRESSION => self.member_access_type(file, node, depth),
            kind if is_this(kind) => self.enclosing_type_symbol(file, node),
            _ => None,
        }
    }

    /// Type an implicit `new()` takes from its surroundings.
    fn target_type(&self, file: &SourceFile, node: Node<'_>, depth: usize) -> Option<TypeSymbol> {
        let root = nav::value_root(file, node);
        if let Some(declarator) = nav::declarator_of(root) {
            return self.resolve_type_node(file, nav::declared_type(declarator.declaration)?);
        }
        let parent = root.parent()?;
        match parent.kind() {
            ASSIGNMENT_EXPRESSION => {
                let right = parent.child_by_field_name("right")?;
                if !nav::same(right, root) {
                    return None;
                }
                self.type_at(file, parent.child_by_field_name("left")?, depth)
            }
            RETURN_STATEMENT => {
                let scope = nav::enclosing_scope(parent)?;
                if is_anonymous_function(scope.kind()) {
                    return None;
                }
                self.resolve_type_node(file, nav::declared_type(scope)?)
            }
            ARROW_EXPRESSION_CLAUSE => {
                self.resolve_type_node(file, nav::declared_type(parent.parent()?)?)
            }
            PROPERTY_DECLARATION => self.resolve_type_node(file, nav::declared_type(parent)?),
            EQUALS_VALUE_CLAUSE => {
                self.resolve_type_node(file, nav::declared_type(parent.parent()?)?)
            }
            _ => None,
        }
    }

    /// Receiver type of a member access, or the named type for static access.
    fn receiver_type(&self, file: &SourceFile, receiver: Node<'_>, depth: usize) -> Option<TypeSymbol> {
        self.type_at(file, receiver, depth)
            .or_else(|| self.type_expression(file, receiver))
    }

    fn member_access_type(&self, file: &SourceFile, node: Node<'_>, depth: usize) -> Option<TypeSymbol> {
        let owner = self.receiver_type(file, node.child_by_field_name("expression")?, depth)?;
        let name = nav::simple_name(file, node.child_by_field_name("name")?);
        let (decl, member) = self
            .index
            .find_member(&owner.key(), name, MemberDecl::is_value, None)?;
        let subst = substitution(decl, Some(&owner));
        self.index.resolve(member.ty.as_ref()?, &decl.scope, &subst)
    }

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    fn resolve_call(&self, file: &SourceFile, invocation: Node<'_>, depth: usize) -> Option<ResolvedCall> {
        let target = nav::call_target(invocation)?;
        let name = nav::simple_name(file, target.name);
        let arg_count = nav::arguments(invocation).len();
        let scope = self.scope_at(file, invocation);
        let type_args = self.explicit_type_arguments(file, target.name, &scope);
        let is_method = |m: &MemberDecl| m.kind == MemberKind::Method;

        if let Some(receiver) = target.receiver {
            if let Some(receiver_type) = self.type_at(file, receiver, depth) {
                if let Some((decl, member)) =
                    self.index
                        .find_member(&receiver_type.key(), name, is_method, Some(arg_count))
                {
                    return Some(self.bind(decl, member, Some(&receiver_type), &type_args, false));
                }
                let (decl, member) = self.index.find_extension(name, &receiver_type, arg_count)?;
                return Some(self.bind(decl, member, None, &type_args, true));
            }
            let owner = self.type_expression(file, receiver)?;
            let (decl, member) = self
                .index
                .find_member(&owner.key(), name, is_method, Some(arg_count))?;
            return Some(self.bind(decl, member, Some(&owner), &type_args, false));
        }

        if let Some(call) = self.local_function_call(file, invocation, name, &type_args) {
            return Some(call);
        }
        for key in scope.enclosing_types.iter().rev() {
            if let Some((decl, member)) = self.index.find_member(key, name, is_method, Some(arg_count)) {
                return Some(self.bind(decl, member, None, &type_args, false));
            }
        }
        scope.usings.static_types.iter().find_map(|written| {
            let written = TypeRef::parse(written)?;
            let key = self.index.lookup_key(&written.name, written.arity(), &scope)?;
            let (decl, member) = self.index.find_member(&key, name, |m| is_method(m) && m.is_static, Some(arg_count))?;
            Some(self.bind(decl, member, None, &type_args, false))
        })
    }

    /// `Fake<IDisposable>` in `A.Fake<IDisposable>()`.
    fn explicit_type_arguments(&self, file: &SourceFile, name: Node<'_>, scope: &NameScope) -> Vec<TypeSymbol> {
        if name.kind() != GENERIC_NAME {
            return Vec::new();
        }
        let Some(written) = TypeRef::parse(file.node_text(name)) else {
            return Vec::new();
        };
        written
            .args
            .iter()
            .map(|arg| {
                self.index
                    .resolve(arg, scope, &Substitution::new())
                    .unwrap_or_else(|| TypeSymbol::opaque(arg.to_string()))
            })
            .collect()
    }

    fn bind(
        &self,
        decl: &TypeDecl,
        member: &MemberDecl,
        receiver: Option<&TypeSymbol>,
        type_args: &[TypeSymbol],
        is_extension: bool,
    ) -> ResolvedCall {
        let mut subst = substitution(decl, receiver);
        for (param, arg) in member.type_params.iter().zip(type_args) {
            subst.insert(param.clone(), arg.clone());
        }
        let mut scope = decl.scope.clone();
        scope.type_params.extend(member.type_params.iter().cloned());

        let return_type = match member.returns_type_argument {
            Some(index) => type_args.get(index).cloned(),
            None => member
                .ty
                .as_ref()
                .and_then(|ty| self.index.resolve(ty, &scope, &subst)),
        };
        let parameters = member.params.iter().flatten().map(|param| {
            param
                .ty
                .as_ref()
                .and_then(|ty| self.index.resolve(ty, &scope, &subst))
                .map_or_else(|| "?".to_string(), |symbol| symbol.full_name)
        });

        let kind = match member.kind {
            MemberKind::Constructor => SymbolKind::Constructor,
            _ => SymbolKind::Method,
        };
        let mut symbol = Symbol::new(kind, member.name.clone()).with_parameters(parameters);
        symbol.containing_type = self.index.symbol_for(&decl.key, Vec::new());
        symbol.is_static = member.is_static;
        symbol.is_extension = is_extension;
        ResolvedCall { symbol, return_type }
    }

    fn local_function_call(
        &self,
        file: &SourceFile,
        invocation: Node<'_>,
        name: &str,
        type_args: &[TypeSymbol],
    ) -> Option<ResolvedCall> {
        // Outermost scope below the type: local functions are visible
        // throughout the member that declares them.
        let member = ancestors(invocation)
            .take_while(|a| !is_type_declaration(a.kind()))
            .filter(|a| is_scope(a.kind()) || a.kind() == COMPILATION_UNIT)
            .last()?;
        let function = Descendants::of_kind(member, LOCAL_FUNCTION_STATEMENT).find(|f| {
            nav::declaration_name(*f).is_some_and(|n| file.node_text(n) == name)
        })?;

        let mut scope = self.scope_at(file, function);
        let own_params = type_parameters(file, function);
        scope.type_params.extend(own_params.iter().cloned());
        let subst: Substitution = own_params.into_iter().zip(type_args.iter().cloned()).collect();
        let resolve = |ty: &TypeRef| self.index.resolve(ty, &scope, &subst);

        let return_type = nav::declared_type(function)
            .and_then(|t| TypeRef::parse(file.node_text(t)))
            .filter(|t| t.name != "void")
            .and_then(|t| resolve(&t));
        let parameters = parameters(file, function).into_iter().map(|param| {
            param
                .ty
                .as_ref()
                .and_then(resolve)
                .map_or_else(|| "?".to_string(), |symbol| symbol.full_name)
        });
        Some(ResolvedCall {
            symbol: Symbol::new(SymbolKind::Method, name).with_parameters(parameters),
            return_type,
        })
    }

    fn member_symbol(&self, decl: &TypeDecl, member: &MemberDecl) -> Symbol {
        let kind = match member.kind {
            MemberKind::Property => SymbolKind::Property,
            _ => SymbolKind::Field,
        };
        let mut symbol = Symbol::new(kind, member.name.clone());
        symbol.containing_type = self.index.symbol_for(&decl.key, Vec::new());
        symbol.is_static = member.is_static;
        symbol
    }
}

impl SemanticModel for SourceModel {
    fn type_of(&self, file: &SourceFile, node: Node<'_>) -> Option<TypeSymbol> {
        self.type_at(file, node, 0)
    }

    fn symbol_of(&self, file: &SourceFile, node: Node<'_>) -> Option<Symbol> {
        match node.kind() {
            INVOCATION_EXPRESSION => self.resolve_call(file, node, 0).map(|call| call.symbol),
            kind if is_construction(kind) => {
                let ty = self.type_at(file, node, 0)?;
                Some(Symbol::new(SymbolKind::Constructor, ty.name()).in_type(ty))
            }
            IDENTIFIER => {
                let name = file.node_text(node);
                Some(match self.lookup_value(file, node, name)? {
                    Value::Local(_) | Value::Foreach(_) => Symbol::new(SymbolKind::Local, name),
                    Value::Parameter(_) | Value::Untyped => Symbol::new(SymbolKind::Parameter, name),
                    Value::Member(decl, member) => self.member_symbol(decl, member),
                })
            }
            MEMBER_ACCESS_EXPRESSION => {
                let owner = self.receiver_type(file, node.child_by_field_name("expression")?, 0)?;
                let name = nav::simple_name(file, node.child_by_field_name("name")?);
                let (decl, member) = self
                    .index
                    .find_member(&owner.key(), name, MemberDecl::is_value, None)?;
                Some(self.member_symbol(decl, member))
            }
            _ => None,
        }
    }
}

/// Bindings of a declaration's generic parameters from a constructed receiver.
fn substitution(decl: &TypeDecl, receiver: Option<&TypeSymbol>) -> Substitution {
    match receiver {
        Some(receiver) if receiver.key() == decl.key => decl
            .type_params
            .iter()
            .cloned()
            .zip(receiver.type_arguments.iter().cloned())
            .collect(),
        _ => Substitution::new(),
    }
}

/// A parameter named `name` of a method, local function or lambda.
fn find_parameter<'t>(file: &SourceFile, scope: Node<'t>, name: &str) -> Option<Value<'static, 't>> {
    let list = scope.child_by_field_name("parameters").or_else(|| {
        named_children(scope)
            .into_iter()
            .find(|child| child.kind() == PARAMETER_LIST)
    })?;
    match list.kind() {
        PARAMETER_LIST => named_children(list)
            .into_iter()
            .filter(|child| child.kind() == PARAMETER)
            .find(|param| nav::declaration_name(*param).is_some_and(|n| file.node_text(n) == name))
            .map(|param| {
                if nav::declared_type(param).is_some() {
                    Value::Parameter(param)
                } else {
                    Value::Untyped
                }
            }),
        IDENTIFIER | IMPLICIT_PARAMETER if file.node_text(list) == name => Some(Value::Untyped),
        _ => None,
    }
}

/// The last declarator of `name` in `scope` that precedes `site`.
fn find_local<'t>(file: &SourceFile, scope: Node<'t>, site: Node<'_>, name: &str) -> Option<Node<'t>> {
    Descendants::of_kind(scope, VARIABLE_DECLARATOR)
        .filter(|declarator| declarator.start_byte() < site.start_byte())
        .filter(|declarator| {
            nav::declarator_name(*declarator).is_some_and(|n| file.node_text(n) == name)
        })
        .filter(|declarator| nav::enclosing_scope(*declarator).is_some_and(|s| nav::same(s, scope)))
        .filter(|declarator| {
            !matches!(
                declarator.parent().and_then(|d| d.parent()).map(|h| h.kind()),
                Some(FIELD_DECLARATION | EVENT_FIELD_DECLARATION)
            )
        })
        .last()
}

//! Named traversal combinators over the C# syntax tree.
//!
//! Every structural question the analysis asks ("is this the value of a
//! declarator?", "which invocation receives this argument?") is answered
//! here, once, returning `Option`. Shapes that differ between grammar
//! releases are normalized in this module so callers never see them.

use tree_sitter::Node;

use super::kinds::*;
use super::{ancestors, children, named_children, SourceFile};

/// Node identity within one tree.
pub fn same(a: Node<'_>, b: Node<'_>) -> bool {
    a.id() == b.id()
}

fn field_or_first<'t>(node: Node<'t>, field: &str) -> Option<Node<'t>> {
    node.child_by_field_name(field)
        .or_else(|| named_children(node).into_iter().next())
}

// ============================================================================
// Value flow through transparent wrappers
// ============================================================================

/// Climb from an expression through wrappers that hand its value on
/// unchanged: parentheses, casts, `as`, `!`, `??`, and `?:` branches.
pub fn value_root<'t>(file: &SourceFile, node: Node<'t>) -> Node<'t> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if !passes_value_through(file, parent, current) {
            break;
        }
        current = parent;
    }
    current
}

fn passes_value_through(file: &SourceFile, parent: Node<'_>, child: Node<'_>) -> bool {
    match parent.kind() {
        PARENTHESIZED_EXPRESSION => true,
        CAST_EXPRESSION => parent
            .child_by_field_name("value")
            .or_else(|| named_children(parent).into_iter().last())
            .is_some_and(|value| same(value, child)),
        AS_EXPRESSION => field_or_first(parent, "left").is_some_and(|left| same(left, child)),
        POSTFIX_UNARY_EXPRESSION => file.node_text(parent).trim_end().ends_with('!'),
        CONDITIONAL_EXPRESSION => {
            !field_or_first(parent, "condition").is_some_and(|cond| same(cond, child))
        }
        BINARY_EXPRESSION => matches!(binary_operator(parent), Some("??" | "as")),
        _ => false,
    }
}

/// Operator token of a binary expression.
pub fn binary_operator(node: Node<'_>) -> Option<&'static str> {
    if let Some(op) = node.child_by_field_name("operator") {
        return Some(op.kind());
    }
    children(node)
        .into_iter()
        .find(|child| !child.is_named())
        .map(|child| child.kind())
}

/// Strip wrappers downward: `((T)(x))` yields `x`.
pub fn unwrap_value<'t>(file: &SourceFile, node: Node<'t>) -> Node<'t> {
    let mut current = node;
    loop {
        let inner = match current.kind() {
            PARENTHESIZED_EXPRESSION => named_children(current).into_iter().next(),
            CAST_EXPRESSION => current
                .child_by_field_name("value")
                .or_else(|| named_children(current).into_iter().last()),
            AS_EXPRESSION => field_or_first(current, "left"),
            POSTFIX_UNARY_EXPRESSION if file.node_text(current).trim_end().ends_with('!') => {
                named_children(current).into_iter().next()
            }
            _ => None,
        };
        match inner {
            Some(inner) => current = inner,
            None => return current,
        }
    }
}

/// The `await` expression consuming this node, looking through parentheses.
pub fn awaited_by<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            PARENTHESIZED_EXPRESSION => current = parent,
            AWAIT_EXPRESSION => return Some(parent),
            _ => return None,
        }
    }
    None
}

/// Expression operand of `await`, `return` and similar single-child nodes.
pub fn operand<'t>(node: Node<'t>) -> Option<Node<'t>> {
    named_children(node).into_iter().next()
}

// ============================================================================
// Scopes and declarations
// ============================================================================

/// Nearest enclosing constructor, method, local function, lambda,
/// anonymous method, property or indexer. Top-level statements live in the
/// compilation unit.
pub fn enclosing_scope(node: Node<'_>) -> Option<Node<'_>> {
    let mut in_global_statement = false;
    for ancestor in ancestors(node) {
        if is_scope(ancestor.kind()) {
            return Some(ancestor);
        }
        if ancestor.kind() == GLOBAL_STATEMENT {
            in_global_statement = true;
        }
        if ancestor.kind() == COMPILATION_UNIT && in_global_statement {
            return Some(ancestor);
        }
    }
    None
}

/// Nearest enclosing class, struct, interface or record.
pub fn enclosing_type(node: Node<'_>) -> Option<Node<'_>> {
    ancestors(node).find(|a| is_type_declaration(a.kind()))
}

/// Name node of a type or member declaration.
pub fn declaration_name(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("name").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == IDENTIFIER)
    })
}

/// Member list of a type declaration.
pub fn type_body(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("body").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == DECLARATION_LIST)
    })
}

/// Whether a declaration carries the given modifier keyword.
pub fn has_modifier(file: &SourceFile, node: Node<'_>, keyword: &str) -> bool {
    named_children(node)
        .into_iter()
        .any(|child| child.kind() == MODIFIER && file.node_text(child) == keyword)
        || children(node)
            .into_iter()
            .any(|child| !child.is_named() && child.kind() == keyword)
}

/// Declared type of a variable declaration, field, property, parameter or method.
pub fn declared_type(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("type")
        .or_else(|| node.child_by_field_name("returns"))
        .or_else(|| match node.kind() {
            VARIABLE_DECLARATION => named_children(node).into_iter().next(),
            _ => None,
        })
}

/// A variable declarator whose initializer is a given value.
#[derive(Debug, Clone, Copy)]
pub struct Declarator<'t> {
    pub declarator: Node<'t>,
    pub name: Node<'t>,
    /// The `variable_declaration` carrying the declared type.
    pub declaration: Node<'t>,
    /// Statement or member holding the declaration.
    pub holder: Node<'t>,
}

impl<'t> Declarator<'t> {
    pub fn is_field(&self) -> bool {
        matches!(self.holder.kind(), FIELD_DECLARATION | EVENT_FIELD_DECLARATION)
    }
}

/// Name node of a variable declarator.
pub fn declarator_name(declarator: Node<'_>) -> Option<Node<'_>> {
    declaration_name(declarator)
}

/// Initializer of a variable declarator, with or without an
/// `equals_value_clause` wrapper.
pub fn declarator_value(declarator: Node<'_>) -> Option<Node<'_>> {
    let kids = children(declarator);
    if let Some(eq) = kids.iter().position(|child| child.kind() == "=") {
        return kids[eq + 1..]
            .iter()
            .find(|child| child.is_named() && child.kind() != COMMENT)
            .copied();
    }
    kids.iter()
        .find(|child| child.kind() == EQUALS_VALUE_CLAUSE)
        .and_then(|clause| operand(*clause))
}

/// The declarator this value initializes.
pub fn declarator_of<'t>(value: Node<'t>) -> Option<Declarator<'t>> {
    let mut parent = value.parent()?;
    if parent.kind() == EQUALS_VALUE_CLAUSE {
        parent = parent.parent()?;
    }
    if parent.kind() != VARIABLE_DECLARATOR {
        return None;
    }
    if !declarator_value(parent).is_some_and(|v| same(v, value)) {
        return None;
    }
    let declaration = parent.parent().filter(|d| d.kind() == VARIABLE_DECLARATION)?;
    Some(Declarator {
        declarator: parent,
        name: declarator_name(parent)?,
        declaration,
        holder: declaration.parent()?,
    })
}

/// Whether a local declaration statement is a `using var` declaration.
pub fn is_using_declaration(statement: Node<'_>) -> bool {
    statement.kind() == LOCAL_DECLARATION_STATEMENT
        && children(statement).iter().any(|child| child.kind() == "using")
}

/// Body statement of a `using (...)` statement.
pub fn using_body(statement: Node<'_>) -> Option<Node<'_>> {
    statement
        .child_by_field_name("body")
        .or_else(|| named_children(statement).into_iter().last())
}

/// Resource expressions and declarations of a scoped-acquisition header.
pub fn using_header(statement: Node<'_>) -> Vec<Node<'_>> {
    match statement.kind() {
        USING_STATEMENT => {
            let body = using_body(statement);
            named_children(statement)
                .into_iter()
                .filter(|child| !body.is_some_and(|b| same(b, *child)))
                .collect()
        }
        LOCAL_DECLARATION_STATEMENT if is_using_declaration(statement) => named_children(statement)
            .into_iter()
            .filter(|child| child.kind() == VARIABLE_DECLARATION)
            .collect(),
        _ => Vec::new(),
    }
}

/// The `using` statement or declaration whose header contains this node.
pub fn enclosing_using_header(node: Node<'_>) -> Option<Node<'_>> {
    let mut child = node;
    for parent in ancestors(node) {
        match parent.kind() {
            USING_STATEMENT => {
                return match using_body(parent) {
                    Some(body) if same(body, child) => None,
                    _ => Some(parent),
                };
            }
            LOCAL_DECLARATION_STATEMENT => {
                return is_using_declaration(parent).then_some(parent);
            }
            BLOCK | COMPILATION_UNIT | DECLARATION_LIST => return None,
            kind if is_scope(kind) || kind.ends_with("_statement") => return None,
            _ => child = parent,
        }
    }
    None
}

// ============================================================================
// Invocations and arguments
// ============================================================================

/// Receiver and method name of an invocation.
#[derive(Debug, Clone, Copy)]
pub struct CallTarget<'t> {
    /// Expression left of the dot; `None` for unqualified calls.
    pub receiver: Option<Node<'t>>,
    /// Simple or generic name of the invoked method.
    pub name: Node<'t>,
}

/// Split an invocation into receiver and method name.
///
/// Handles `a.M()`, `a?.M()` in both grammar nestings, `M()` and `M<T>()`.
pub fn call_target(invocation: Node<'_>) -> Option<CallTarget<'_>> {
    let function = field_or_first(invocation, "function")?;
    match function.kind() {
        MEMBER_ACCESS_EXPRESSION => Some(CallTarget {
            receiver: function.child_by_field_name("expression"),
            name: function
                .child_by_field_name("name")
                .or_else(|| named_children(function).into_iter().last())?,
        }),
        CONDITIONAL_ACCESS_EXPRESSION => {
            let kids = named_children(function);
            let binding = kids
                .iter()
                .find(|kid| kid.kind() == MEMBER_BINDING_EXPRESSION)?;
            Some(CallTarget {
                receiver: kids.first().copied(),
                name: binding_name(*binding)?,
            })
        }
        MEMBER_BINDING_EXPRESSION => {
            let receiver = invocation
                .parent()
                .filter(|p| p.kind() == CONDITIONAL_ACCESS_EXPRESSION)
                .and_then(|p| named_children(p).into_iter().next());
            Some(CallTarget {
                receiver,
                name: binding_name(function)?,
            })
        }
        IDENTIFIER | GENERIC_NAME => Some(CallTarget {
            receiver: None,
            name: function,
        }),
        _ => None,
    }
}

fn binding_name(binding: Node<'_>) -> Option<Node<'_>> {
    binding
        .child_by_field_name("name")
        .or_else(|| named_children(binding).into_iter().last())
}

/// Identifier text of a simple or generic name (`Fake` for `Fake<T>`).
pub fn simple_name<'f>(file: &'f SourceFile, name: Node<'_>) -> &'f str {
    match name.kind() {
        GENERIC_NAME => named_children(name)
            .into_iter()
            .next()
            .map(|id| file.node_text(id))
            .unwrap_or_else(|| file.node_text(name)),
        _ => file.node_text(name),
    }
}

/// Method name of an invocation.
pub fn invoked_name<'f>(file: &'f SourceFile, invocation: Node<'_>) -> Option<&'f str> {
    call_target(invocation).map(|target| simple_name(file, target.name))
}

/// Argument nodes of an invocation or construction, in source order.
pub fn arguments(node: Node<'_>) -> Vec<Node<'_>> {
    let list = node.child_by_field_name("arguments").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == ARGUMENT_LIST)
    });
    list.map(|list| {
        named_children(list)
            .into_iter()
            .filter(|child| child.kind() == ARGUMENT)
            .collect()
    })
    .unwrap_or_default()
}

/// Expression passed by an argument.
pub fn argument_value(argument: Node<'_>) -> Option<Node<'_>> {
    named_children(argument).into_iter().last()
}

/// Name of a named argument (`leaveOpen: true`).
pub fn argument_name<'f>(file: &'f SourceFile, argument: Node<'_>) -> Option<&'f str> {
    if let Some(name) = argument.child_by_field_name("name") {
        return Some(file.node_text(name));
    }
    let kids = named_children(argument);
    if let Some(name_colon) = kids.iter().find(|kid| kid.kind() == "name_colon") {
        return Some(file.node_text(*name_colon).trim_end_matches(':').trim());
    }
    let has_colon = children(argument).iter().any(|kid| kid.kind() == ":");
    if has_colon && kids.len() > 1 {
        return Some(file.node_text(kids[0]));
    }
    None
}

/// The invocation or construction receiving this value as a direct argument.
pub fn argument_owner<'t>(value: Node<'t>) -> Option<Node<'t>> {
    let argument = value.parent().filter(|p| p.kind() == ARGUMENT)?;
    if !argument_value(argument).is_some_and(|v| same(v, value)) {
        return None;
    }
    let list = argument.parent().filter(|p| p.kind() == ARGUMENT_LIST)?;
    let owner = list.parent()?;
    matches!(owner.kind(), INVOCATION_EXPRESSION | OBJECT_CREATION_EXPRESSION | IMPLICIT_OBJECT_CREATION_EXPRESSION)
        .then_some(owner)
}

/// The invocation calling a method on this value (`value.M()` or `value?.M()`).
pub fn invocation_on_receiver<'t>(value: Node<'t>) -> Option<Node<'t>> {
    let parent = value.parent()?;
    match parent.kind() {
        MEMBER_ACCESS_EXPRESSION => {
            if !parent
                .child_by_field_name("expression")
                .is_some_and(|e| same(e, value))
            {
                return None;
            }
            let invocation = parent.parent().filter(|p| p.kind() == INVOCATION_EXPRESSION)?;
            field_or_first(invocation, "function")
                .is_some_and(|f| same(f, parent))
                .then_some(invocation)
        }
        CONDITIONAL_ACCESS_EXPRESSION => {
            if !named_children(parent)
                .first()
                .is_some_and(|first| same(*first, value))
            {
                return None;
            }
            if let Some(outer) = parent.parent().filter(|p| p.kind() == INVOCATION_EXPRESSION) {
                return Some(outer);
            }
            named_children(parent)
                .into_iter()
                .find(|child| child.kind() == INVOCATION_EXPRESSION)
        }
        _ => None,
    }
}

/// Whether an expression names `name` directly or as `this.name`.
pub fn refers_to(file: &SourceFile, expression: Node<'_>, name: &str) -> bool {
    let expression = unwrap_value(file, expression);
    match expression.kind() {
        IDENTIFIER => file.node_text(expression) == name,
        MEMBER_ACCESS_EXPRESSION => {
            let receiver = expression.child_by_field_name("expression");
            let member = expression.child_by_field_name("name");
            receiver.is_some_and(|r| is_this(r.kind()) || file.node_text(r) == "this")
                && member.is_some_and(|m| file.node_text(m) == name)
        }
        _ => false,
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Whether an accessor declaration is a getter.
pub fn is_getter(file: &SourceFile, accessor: Node<'_>) -> bool {
    if let Some(name) = accessor.child_by_field_name("name") {
        return file.node_text(name) == "get";
    }
    children(accessor).iter().any(|child| child.kind() == "get")
}

/// The property owning an accessor.
pub fn accessor_property(accessor: Node<'_>) -> Option<Node<'_>> {
    accessor
        .parent()
        .filter(|p| p.kind() == ACCESSOR_LIST)
        .and_then(|list| list.parent())
        .filter(|p| p.kind() == PROPERTY_DECLARATION)
}

/// The property or method whose `=> expr` body is this value.
pub fn arrow_body_owner(value: Node<'_>) -> Option<Node<'_>> {
    let clause = value.parent().filter(|p| p.kind() == ARROW_EXPRESSION_CLAUSE)?;
    clause.parent()
}

//! Node kind names produced by the tree-sitter C# grammar.
//!
//! Kept in one place so the rest of the crate never spells a grammar
//! string inline.

pub const COMPILATION_UNIT: &str = "compilation_unit";
pub const GLOBAL_STATEMENT: &str = "global_statement";
pub const NAMESPACE_DECLARATION: &str = "namespace_declaration";
pub const FILE_SCOPED_NAMESPACE_DECLARATION: &str = "file_scoped_namespace_declaration";
pub const USING_DIRECTIVE: &str = "using_directive";
pub const DECLARATION_LIST: &str = "declaration_list";
pub const COMMENT: &str = "comment";

// Type declarations
pub const CLASS_DECLARATION: &str = "class_declaration";
pub const STRUCT_DECLARATION: &str = "struct_declaration";
pub const INTERFACE_DECLARATION: &str = "interface_declaration";
pub const RECORD_DECLARATION: &str = "record_declaration";
pub const RECORD_STRUCT_DECLARATION: &str = "record_struct_declaration";
pub const BASE_LIST: &str = "base_list";
pub const TYPE_PARAMETER_LIST: &str = "type_parameter_list";
pub const TYPE_PARAMETER: &str = "type_parameter";

// Members
pub const FIELD_DECLARATION: &str = "field_declaration";
pub const EVENT_FIELD_DECLARATION: &str = "event_field_declaration";
pub const PROPERTY_DECLARATION: &str = "property_declaration";
pub const INDEXER_DECLARATION: &str = "indexer_declaration";
pub const METHOD_DECLARATION: &str = "method_declaration";
pub const CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";
pub const DESTRUCTOR_DECLARATION: &str = "destructor_declaration";
pub const OPERATOR_DECLARATION: &str = "operator_declaration";
pub const CONVERSION_OPERATOR_DECLARATION: &str = "conversion_operator_declaration";
pub const ACCESSOR_LIST: &str = "accessor_list";
pub const ACCESSOR_DECLARATION: &str = "accessor_declaration";
pub const ARROW_EXPRESSION_CLAUSE: &str = "arrow_expression_clause";
pub const PARAMETER_LIST: &str = "parameter_list";
pub const PARAMETER: &str = "parameter";
pub const MODIFIER: &str = "modifier";

// Statements
pub const BLOCK: &str = "block";
pub const LOCAL_DECLARATION_STATEMENT: &str = "local_declaration_statement";
pub const LOCAL_FUNCTION_STATEMENT: &str = "local_function_statement";
pub const USING_STATEMENT: &str = "using_statement";
pub const RETURN_STATEMENT: &str = "return_statement";
pub const FOREACH_STATEMENT: &str = "foreach_statement";
pub const VARIABLE_DECLARATION: &str = "variable_declaration";
pub const VARIABLE_DECLARATOR: &str = "variable_declarator";
pub const EQUALS_VALUE_CLAUSE: &str = "equals_value_clause";

// Expressions
pub const OBJECT_CREATION_EXPRESSION: &str = "object_creation_expression";
pub const IMPLICIT_OBJECT_CREATION_EXPRESSION: &str = "implicit_object_creation_expression";
pub const INVOCATION_EXPRESSION: &str = "invocation_expression";
pub const MEMBER_ACCESS_EXPRESSION: &str = "member_access_expression";
pub const CONDITIONAL_ACCESS_EXPRESSION: &str = "conditional_access_expression";
pub const MEMBER_BINDING_EXPRESSION: &str = "member_binding_expression";
pub const ARGUMENT_LIST: &str = "argument_list";
pub const ARGUMENT: &str = "argument";
pub const ASSIGNMENT_EXPRESSION: &str = "assignment_expression";
pub const AWAIT_EXPRESSION: &str = "await_expression";
pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
pub const CAST_EXPRESSION: &str = "cast_expression";
pub const AS_EXPRESSION: &str = "as_expression";
pub const CONDITIONAL_EXPRESSION: &str = "conditional_expression";
pub const BINARY_EXPRESSION: &str = "binary_expression";
pub const POSTFIX_UNARY_EXPRESSION: &str = "postfix_unary_expression";
pub const ARRAY_CREATION_EXPRESSION: &str = "array_creation_expression";
pub const IMPLICIT_ARRAY_CREATION_EXPRESSION: &str = "implicit_array_creation_expression";
pub const INITIALIZER_EXPRESSION: &str = "initializer_expression";
pub const LAMBDA_EXPRESSION: &str = "lambda_expression";
pub const ANONYMOUS_METHOD_EXPRESSION: &str = "anonymous_method_expression";
pub const IDENTIFIER: &str = "identifier";
pub const GENERIC_NAME: &str = "generic_name";
pub const QUALIFIED_NAME: &str = "qualified_name";
pub const ALIAS_QUALIFIED_NAME: &str = "alias_qualified_name";
pub const PREDEFINED_TYPE: &str = "predefined_type";
pub const IMPLICIT_PARAMETER: &str = "implicit_parameter";

/// `this` is exposed under different names across grammar releases.
pub fn is_this(kind: &str) -> bool {
    matches!(kind, "this" | "this_expression")
}

/// Nodes that produce a value which may hold a resource.
pub fn is_resource_creation(kind: &str) -> bool {
    matches!(
        kind,
        OBJECT_CREATION_EXPRESSION | IMPLICIT_OBJECT_CREATION_EXPRESSION | INVOCATION_EXPRESSION
    )
}

pub fn is_construction(kind: &str) -> bool {
    matches!(kind, OBJECT_CREATION_EXPRESSION | IMPLICIT_OBJECT_CREATION_EXPRESSION)
}

pub fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        CLASS_DECLARATION
            | STRUCT_DECLARATION
            | INTERFACE_DECLARATION
            | RECORD_DECLARATION
            | RECORD_STRUCT_DECLARATION
    )
}

/// Lexical scopes a local variable can live in.
pub fn is_scope(kind: &str) -> bool {
    matches!(
        kind,
        CONSTRUCTOR_DECLARATION
            | DESTRUCTOR_DECLARATION
            | METHOD_DECLARATION
            | OPERATOR_DECLARATION
            | CONVERSION_OPERATOR_DECLARATION
            | LOCAL_FUNCTION_STATEMENT
            | LAMBDA_EXPRESSION
            | ANONYMOUS_METHOD_EXPRESSION
            | PROPERTY_DECLARATION
            | INDEXER_DECLARATION
    )
}

/// Scopes whose `return` hands the value to a delegate rather than a member.
pub fn is_anonymous_function(kind: &str) -> bool {
    matches!(kind, LAMBDA_EXPRESSION | ANONYMOUS_METHOD_EXPRESSION)
}

//! Engine tests against a hand-written semantic model.
//!
//! The engine only talks to [`SemanticModel`], so a resolver with canned
//! answers is enough to drive it without any catalog entries.

use disposal_lint::analysis::{
    analyze_file, analyze_file_into, analyze_node, AnalysisContext, Cx, Diagnostic, DiagnosticKind,
    DiagnosticSink,
};
use disposal_lint::config::Config;
use disposal_lint::semantic::{SemanticModel, Symbol, SymbolKind, TypeKind, TypeSymbol};
use disposal_lint::syntax::kinds::OBJECT_CREATION_EXPRESSION;
use disposal_lint::syntax::{nav, Descendants, SourceFile};
use tree_sitter::Node;

/// Knows one resource type, `Acme.Pipe`, and one method, `Acme.Sink.Adopt`.
struct CannedModel;

fn pipe() -> TypeSymbol {
    TypeSymbol::new("Acme.Pipe", TypeKind::Class).with_supertypes(["System.IDisposable"])
}

impl SemanticModel for CannedModel {
    fn type_of(&self, file: &SourceFile, node: Node<'_>) -> Option<TypeSymbol> {
        if node.kind() != OBJECT_CREATION_EXPRESSION {
            return None;
        }
        let ty = node.child_by_field_name("type")?;
        (file.node_text(ty) == "Pipe").then(pipe)
    }

    fn symbol_of(&self, file: &SourceFile, node: Node<'_>) -> Option<Symbol> {
        let target = nav::call_target(node)?;
        (nav::simple_name(file, target.name) == "Adopt").then(|| {
            Symbol::new(SymbolKind::Method, "Adopt")
                .in_type(TypeSymbol::new("Acme.Sink", TypeKind::Class))
                .with_parameters(["System.IDisposable"])
        })
    }
}

fn context_with_sink() -> AnalysisContext {
    let user = Config::from_toml(
        "[[ownership_transfer]]\ntype = \"Acme.Sink\"\nmethods = [\"Adopt(System.IDisposable)\"]\n",
        "engine test",
    )
    .unwrap();
    AnalysisContext::new(&Config::defaults().unwrap().extend(user)).unwrap()
}

fn run(context: &AnalysisContext, source: &str) -> Vec<Diagnostic> {
    let file = SourceFile::parse("canned.cs", source).unwrap();
    analyze_file(context, &CannedModel, &file)
}

#[test]
fn test_local_pipe_reported_by_simple_name() {
    let context = AnalysisContext::with_defaults().unwrap();
    let found = run(&context, "class C { void M() { var p = new Pipe(); } }");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, DiagnosticKind::UnreleasedLocal);
    assert_eq!(found[0].variable_name.as_deref(), Some("p"));
    assert_eq!(found[0].type_name, "Pipe");
    assert_eq!(found[0].id, "DISP001");
}

#[test]
fn test_disposed_pipe_is_quiet() {
    let context = AnalysisContext::with_defaults().unwrap();
    assert!(run(&context, "class C { void M() { var p = new Pipe(); p.Dispose(); } }").is_empty());
}

#[test]
fn test_unresolved_types_are_skipped() {
    let context = AnalysisContext::with_defaults().unwrap();
    assert!(run(&context, "class C { void M() { var w = new Widget(); } }").is_empty());
}

#[test]
fn test_values_returned_inside_arguments_are_quiet() {
    let context = AnalysisContext::with_defaults().unwrap();
    for source in [
        "class C { object M() { return Task.FromResult<Pipe>(new Pipe()); } }",
        "class C { object M() { return new Holder(new Pipe()); } }",
        "class C { object M() { return Wrap(new Pipe()); } }",
        "class C { object M() => Wrap(new Pipe()); }",
        "class C { object M() { var p = new Pipe(); return Wrap(p); } }",
    ] {
        assert!(run(&context, source).is_empty(), "reported in {}", source);
    }
    assert_eq!(run(&context, "class C { void M() { Wrap(new Pipe()); } }").len(), 1);
}

#[test]
fn test_configured_transfer_decides_argument() {
    let source = "class C { void M(Sink sink) { sink.Adopt(new Pipe()); } }";

    let defaults = AnalysisContext::with_defaults().unwrap();
    let found = run(&defaults, source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, DiagnosticKind::UnreleasedAnonymous);

    assert!(run(&context_with_sink(), source).is_empty());
}

#[test]
fn test_analyze_node_on_single_creation() {
    let context = AnalysisContext::with_defaults().unwrap();
    let file = SourceFile::parse("canned.cs", "class C { void M() { new Pipe(); new Widget(); } }").unwrap();
    let cx = Cx {
        file: &file,
        model: &CannedModel,
        context: &context,
    };
    let creations: Vec<Node<'_>> = Descendants::of_kind(file.root(), OBJECT_CREATION_EXPRESSION).collect();
    assert_eq!(creations.len(), 2);

    let pipe = analyze_node(&cx, creations[0]).expect("pipe should be reported");
    assert_eq!(pipe.kind, DiagnosticKind::UnreleasedAnonymous);
    assert_eq!(pipe.location.start_line, 0);
    assert_eq!(pipe.location.start_column, 21);
    assert!(analyze_node(&cx, creations[1]).is_none());
}

#[test]
fn test_custom_sink_receives_diagnostics_in_order() {
    #[derive(Default)]
    struct Names(Vec<String>);

    impl DiagnosticSink for Names {
        fn accept(&mut self, diagnostic: Diagnostic) {
            self.0.push(diagnostic.variable_name.unwrap_or_default());
        }
    }

    let context = AnalysisContext::with_defaults().unwrap();
    let file = SourceFile::parse(
        "canned.cs",
        "class C { Pipe _keep = new Pipe(); void M() { var a = new Pipe(); var b = new Pipe(); } }",
    )
    .unwrap();
    let mut sink = Names::default();
    analyze_file_into(&context, &CannedModel, &file, &mut sink);
    assert_eq!(sink.0, vec!["_keep", "a", "b"]);
}

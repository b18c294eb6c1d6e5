use anyhow::{bail, Context, Result};
use bpaf::Bpaf;
use disposal_lint::analysis::{AnalysisContext, Compilation};
use disposal_lint::config::Config;
use disposal_lint::output::{render, OutputFormat, RenderContext};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage)]
/// Static analyzer for C# objects that implement IDisposable and are never disposed
enum Cmd {
    /// Analyze C# files and report unreleased resources
    #[bpaf(command)]
    Check {
        /// Output format [diagnostic (default), json]
        #[bpaf(short, long, argument("FORMAT"), fallback(OutputFormat::default()))]
        format: OutputFormat,

        /// Configuration file extending the built-in defaults
        #[bpaf(short, long, argument("FILE"))]
        config: Option<PathBuf>,

        /// C# files, or directories searched for `*.cs` files
        #[bpaf(positional("PATH"), many)]
        paths: Vec<PathBuf>,
    },

    /// Start LSP server
    #[bpaf(command)]
    Lsp {
        /// Configuration file extending the built-in defaults
        #[bpaf(short, long, argument("FILE"))]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    use bpaf::Args;

    let cmd = match cmd().run_inner(Args::current_args()) {
        Ok(cmd) => cmd,
        Err(bpaf::ParseFailure::Stdout(msg, _)) => {
            print!("{}", msg);
            std::process::exit(0);
        }
        Err(bpaf::ParseFailure::Completion(c)) => {
            print!("{}", c);
            std::process::exit(0);
        }
        Err(bpaf::ParseFailure::Stderr(msg)) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    match cmd {
        Cmd::Check {
            format,
            config,
            paths,
        } => {
            init_tracing("warn");
            let context = load_context(config.as_deref())?;
            let found = check(&context, &paths, format)?;
            if found > 0 {
                std::process::exit(1);
            }
        }

        Cmd::Lsp { config } => {
            init_tracing("info");
            let context = load_context(config.as_deref())?;
            disposal_lint::lsp::run_server(context)?;
        }
    }

    Ok(())
}

fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_context(config: Option<&Path>) -> Result<AnalysisContext> {
    let config = Config::load(config)?;
    Ok(AnalysisContext::new(&config)?)
}

/// Analyze the given paths and print the report. Returns the number of
/// diagnostics.
fn check(context: &AnalysisContext, paths: &[PathBuf], format: OutputFormat) -> Result<usize> {
    if paths.is_empty() {
        bail!("no input files; pass C# files or directories");
    }

    let mut sources = Vec::new();
    for path in collect_sources(paths)? {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        sources.push((path, text));
    }
    if sources.is_empty() {
        bail!("no `.cs` files found");
    }

    let file_count = sources.len();
    let compilation = Compilation::parse(sources, context)?;
    let diagnostics = compilation.analyze(context);

    let ctx = RenderContext::new(compilation.files(), &diagnostics);
    print!("{}", render(format, &ctx));

    if format == OutputFormat::Diagnostic {
        eprintln!(
            "{} unreleased resource{} in {} file{}",
            diagnostics.len(),
            if diagnostics.len() == 1 { "" } else { "s" },
            file_count,
            if file_count == 1 { "" } else { "s" },
        );
    }
    Ok(diagnostics.len())
}

/// Expand directories to the `.cs` files below them.
fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let pattern = path.join("**").join("*.cs");
        let mut found: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .with_context(|| format!("invalid search pattern {}", pattern.display()))?
            .flatten()
            .filter(|entry| entry.is_file())
            .collect();
        found.sort();
        tracing::debug!("{}: {} source files", path.display(), found.len());
        files.extend(found);
    }
    Ok(files)
}

//! autocpp: look up header apidocs by signature.
//!
//! `autocpp -c autocpp.toml 'fun(int& a)' class:widget` prints each
//! resolved declaration followed by its documentation. `--list` dumps the
//! whole table instead.

use anyhow::{Context, Result};
use autocpp::{
    resolve, BuildContext, Config, Directive, Reporter, ResolvedItem, StderrReporter,
};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "autocpp",
    about = "Look up /** */ apidocs from a C++ header by declaration signature"
)]
struct Cli {
    /// Signatures to resolve. Prefix with `class:` for classes; `function:`
    /// or no prefix means a function.
    queries: Vec<String>,

    /// Config file (TOML with `input` and `macros`). Defaults to
    /// ./autocpp.toml when present.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Header to scan, overriding the config
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Extra macro definition `NAME(args)=replacement`. Repeatable.
    #[arg(short = 'm', long = "macro")]
    macros: Vec<String>,

    /// Directory the input path is relative to
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Output format: text (default) or json
    #[arg(short = 'f', long, default_value = "text")]
    format: String,

    /// Print every table key instead of resolving queries
    #[arg(long)]
    list: bool,

    /// Debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = OutputFormat::parse(&cli.format)?;
    let ctx = build_context(&cli)?;
    let reporter = StderrReporter;

    if cli.list {
        return list_mode(&ctx, &reporter, format);
    }

    let mut items = Vec::new();
    for query in &cli.queries {
        let (directive, signature) = parse_query(query);
        let item = resolve(&ctx, directive, signature, &reporter)
            .with_context(|| format!("failed to resolve {}", query))?;
        items.push(item);
    }

    match format {
        OutputFormat::Text => print!("{}", render_text(&items)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => anyhow::bail!("unknown format: {}. Use text or json", name),
        }
    }
}

/// Merge the config file with command line overrides.
fn build_context(cli: &Cli) -> Result<BuildContext> {
    let config_path = match &cli.config {
        Some(p) => Some(p.clone()),
        None => {
            let default = Path::new(autocpp::config::DEFAULT_CONFIG_FILE);
            default.is_file().then(|| default.to_path_buf())
        }
    };

    let mut config = match &config_path {
        Some(p) => Config::load(p).with_context(|| format!("failed to load {}", p.display()))?,
        None => Config::default(),
    };
    config.macros.extend(cli.macros.iter().cloned());

    let source_root = if let Some(root) = &cli.source_root {
        root.clone()
    } else if cli.input.is_some() {
        PathBuf::from(".")
    } else {
        config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };
    if let Some(input) = &cli.input {
        config.input = Some(input.clone());
    }

    tracing::debug!(
        input = ?config.input,
        root = %source_root.display(),
        macros = config.macros.len(),
        "build context"
    );
    Ok(BuildContext::new(config, source_root))
}

/// `class:sig`, `function:sig`, a directive name prefix such as
/// `autocppclass:sig`, or a bare function signature.
fn parse_query(query: &str) -> (Directive, &str) {
    if let Some((head, sig)) = query.split_once(':') {
        if !sig.starts_with(':') {
            let directive = match head.trim() {
                "class" => Some(Directive::Class),
                "function" => Some(Directive::Function),
                name => name.parse::<Directive>().ok(),
            };
            if let Some(directive) = directive {
                return (directive, sig.trim());
            }
        }
    }
    (Directive::Function, query.trim())
}

fn render_text(items: &[ResolvedItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let signature = item.rendered.as_deref().unwrap_or(&item.signature);
        out.push_str(signature);
        out.push('\n');
        if item.content.is_empty() {
            continue;
        }
        out.push('\n');
        for line in &item.content {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str("    ");
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
    }
    out
}

#[derive(Serialize)]
struct ListedEntry<'a> {
    declaration: &'a str,
    apidoc: &'a [String],
}

fn list_mode(ctx: &BuildContext, reporter: &dyn Reporter, format: OutputFormat) -> Result<()> {
    let table = ctx.table(reporter).context("failed to build apidoc table")?;
    match format {
        OutputFormat::Text => {
            for key in table.keys() {
                println!("{}", key);
            }
        }
        OutputFormat::Json => {
            let listed: BTreeMap<&str, ListedEntry> = table
                .iter()
                .map(|(key, entry)| {
                    (
                        key,
                        ListedEntry {
                            declaration: &entry.declaration_text,
                            apidoc: &entry.apidoc_lines,
                        },
                    )
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
    }
    Ok(())
}

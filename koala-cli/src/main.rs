//! Koala tree builder CLI
//!
//! Reads a JSON array of tokens, runs the tree builder over it and prints
//! the resulting tree together with the recorded parse issues.
//!
//! - koala tokens.json            # html5lib test-format dump
//! - koala --tree tokens.json     # indented DOM dump
//! - koala --json '[...]'         # inline token stream
//! - koala --config cfg.json ...  # tree builder options from JSON

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use koala_common::logger;
use koala_dom::Namespace;
use koala_html::{DomTreeSink, ParseIssue, Token, TreeBuilder, TreeBuilderConfig, print_tree};
use owo_colors::OwoColorize;

/// Koala: HTML5 tree construction from a token stream
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Dump the tree in html5lib test format
    koala tokens.json

    # Inline tokens
    koala --json '[{"type": "StartTag", "name": "p"}, {"type": "Characters", "data": "hi"}]'

    # Parse as the contents of a <tr>
    koala --fragment tr tokens.json

    # Parse inside an <svg> element with trace logging
    koala --fragment svg --fragment-ns svg -vvv tokens.json

    # Options from a JSON file, e.g. {"scripting_enabled": false}
    koala --config cfg.json tokens.json
"#)]
struct Cli {
    /// Path to a JSON file holding an array of tokens
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// JSON token array given directly instead of a file
    #[arg(long, value_name = "JSON")]
    json: Option<String>,

    /// JSON file with tree builder options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Parse a fragment as the children of this element
    #[arg(long, value_name = "NAME")]
    fragment: Option<String>,

    /// Namespace of the fragment context element
    #[arg(long, value_enum, default_value_t = FragmentNamespace::Html)]
    fragment_ns: FragmentNamespace,

    /// Start the fragment in quirks mode
    #[arg(long)]
    quirks: bool,

    /// Print the indented DOM dump instead of the html5lib format
    #[arg(long)]
    tree: bool,

    /// Do not print parse issues
    #[arg(long)]
    no_issues: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FragmentNamespace {
    Html,
    Svg,
    Math,
}

impl From<FragmentNamespace> for Namespace {
    fn from(ns: FragmentNamespace) -> Self {
        match ns {
            FragmentNamespace::Html => Self::Html,
            FragmentNamespace::Svg => Self::Svg,
            FragmentNamespace::Math => Self::MathMl,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(logger::level_for_verbosity(cli.verbose))?;

    let tokens = load_tokens(&cli)?;
    log::info!(target: "cli", "{} tokens", tokens.len());

    let config = load_config(&cli)?;
    log::debug!(target: "cli", "{config:?}");
    let mut builder = TreeBuilder::with_config(DomTreeSink::new(), config);
    if let Some(ref name) = cli.fragment {
        builder.set_fragment_context(name, cli.fragment_ns.into(), None, cli.quirks);
    }
    builder.run(tokens)?;

    let issues = builder.take_issues();
    let sink = builder.into_sink();
    if cli.tree {
        print_tree(sink.tree(), sink.tree().root(), 0);
    } else {
        print!("{}", sink.to_test_format());
    }

    if !cli.no_issues && !issues.is_empty() {
        eprintln!();
        eprintln!("=== Parse Issues ===");
        for issue in &issues {
            print_issue(issue);
        }
    }
    Ok(())
}

/// Read the token array from `--json` or the file argument.
fn load_tokens(cli: &Cli) -> anyhow::Result<Vec<Token>> {
    let source = if let Some(ref json) = cli.json {
        json.clone()
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        anyhow::bail!("a token file or --json is required")
    };
    serde_json::from_str(&source).context("token stream is not a JSON array of tokens")
}

/// Read `--config`, or fall back to the defaults.
fn load_config(cli: &Cli) -> anyhow::Result<TreeBuilderConfig> {
    let Some(ref path) = cli.config else {
        return Ok(TreeBuilderConfig::default());
    };
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}

fn print_issue(issue: &ParseIssue) {
    let label = if issue.is_error {
        "error".red().to_string()
    } else {
        "warning".yellow().to_string()
    };
    eprintln!("  [{}] {label}: {}", issue.token_index, issue.message);
}

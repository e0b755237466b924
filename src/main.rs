//! CLI entry point for the cross-reference resolver.
//!
//! Works on an index snapshot exported by the project indexer and, for caret
//! queries, on a syntax document serialized by the dialect parser.

use anyhow::{Context, anyhow};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use frameref::io::ExitCode;
use frameref::producers::{self, Project, constructor_summary};
use frameref::signature::{CallSite, decode_union, split_encoded, try_resolve_literal};
use frameref::{Declaration, Document, IndexError, MemoryIndex, Settings};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{Level, debug};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Framework-aware cross-reference resolution
#[derive(Parser)]
#[command(
    name = "frameref",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resolve references across service configs, templates, routes and translations",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Index snapshot to query (overrides index_path from the settings)
    #[arg(short, long, global = true, env = "FREF_INDEX")]
    index: Option<PathBuf>,

    /// Log resolution steps to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    #[command(about = "Set up .frameref directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    #[command(about = "Display active settings")]
    Config,

    #[command(
        about = "Split a signature into union branches and call-site/argument parts",
        after_help = "Examples:\n  frameref split '#M#C\\App\\Locator.get?app.mailer'\n  frameref split '#C\\App\\A|#C\\App\\B'"
    )]
    Split {
        signature: String,
    },

    #[command(
        about = "Literal value denoted by a signature argument",
        after_help = "Examples:\n  frameref literal '#K#C\\App\\Mailer.class'\n  frameref literal '#K#C\\App\\Ids.MAILER'"
    )]
    Literal {
        signature: String,
    },

    #[command(
        about = "Service classes a call-site signature resolves to",
        after_help = "Examples:\n  frameref resolve '#M#C\\App\\Locator.get?#K#C\\App\\Ids.MAILER'\n  frameref resolve --call locator_call.json"
    )]
    Resolve {
        /// Encoded signature, unions allowed
        #[arg(required_unless_present = "call", conflicts_with = "call")]
        signature: Option<String>,

        /// Serialized call site, encoded with the configured signature settings
        #[arg(long)]
        call: Option<PathBuf>,
    },

    #[command(about = "Show what the index snapshot holds")]
    Info,

    #[command(about = "Class implementing a container service")]
    Service {
        /// Service id, with or without the @ marker
        id: String,
    },

    #[command(about = "Value of a container parameter")]
    Parameter {
        /// Parameter key, with or without % markers
        key: String,
    },

    #[command(
        about = "Declarations referenced by the token under a caret",
        after_help = "Examples:\n  frameref goto --document base.html.twig.json --offset 42\n  frameref goto --document services.yaml.json --offset 130 --json"
    )]
    Goto {
        /// Serialized syntax document
        #[arg(long)]
        document: PathBuf,

        /// Byte offset of the caret
        #[arg(long)]
        offset: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Constructor overlay for the token under a caret")]
    Overlay {
        #[arg(long)]
        document: PathBuf,

        #[arg(long)]
        offset: u32,
    },
}

#[derive(Serialize)]
struct GotoOutput<'a> {
    offset: u32,
    token: &'a str,
    targets: &'a [Declaration],
}

fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    settings.map_err(|e| {
        anyhow!(IndexError::ConfigError {
            reason: e.to_string(),
        })
    })
}

fn load_index(cli_index: Option<&Path>, settings: &Settings) -> anyhow::Result<MemoryIndex> {
    let path = cli_index
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.resolved_index_path());
    debug!("loading index snapshot from {}", path.display());
    Ok(MemoryIndex::load(&path)?)
}

fn answer(text: Option<String>) -> ExitCode {
    let code = ExitCode::from_query_result(&text);
    match text {
        Some(text) => println!("{text}"),
        None => eprintln!("No answer"),
    }
    code
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = load_settings(cli.config.as_deref())?;
    settings.debug |= cli.debug;
    init_logging(settings.debug);

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force)
                .map_err(|e| anyhow!("Failed to create configuration: {e}"))?;
            println!("Created configuration file at: {}", path.display());
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(ExitCode::Success)
        }

        Commands::Split { signature } => {
            let delimiter = settings.signatures.delimiter;
            for branch in decode_union(&signature) {
                match split_encoded(branch, delimiter) {
                    Some((base, parameter)) => println!("{base}\t{parameter}"),
                    None => println!("{branch}"),
                }
            }
            Ok(ExitCode::Success)
        }

        Commands::Literal { signature } => {
            let index = load_index(cli.index.as_deref(), &settings)?;
            match try_resolve_literal(&index, &signature) {
                Ok(value) => {
                    println!("{value}");
                    Ok(ExitCode::Success)
                }
                Err(miss) => {
                    eprintln!("No literal: {miss}");
                    Ok(ExitCode::NotFound)
                }
            }
        }

        Commands::Resolve { signature, call } => {
            let index = load_index(cli.index.as_deref(), &settings)?;
            let container = Project::new(&index, &settings).container();

            let classes = match (signature, call) {
                (Some(signature), _) => {
                    container.resolve_signature(&signature, settings.signatures.delimiter)
                }
                (None, Some(path)) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read call site {}", path.display()))?;
                    let call: CallSite = serde_json::from_str(&json)
                        .with_context(|| format!("Malformed call site {}", path.display()))?;
                    container.resolve_call_site(&call, &settings.signatures)
                }
                (None, None) => Vec::new(),
            };

            if classes.is_empty() {
                eprintln!("No service class");
                return Ok(ExitCode::NotFound);
            }
            for class in classes {
                println!("{class}");
            }
            Ok(ExitCode::Success)
        }

        Commands::Info => {
            let index = load_index(cli.index.as_deref(), &settings)?;
            if index.is_empty() {
                eprintln!("Index snapshot is empty");
                return Ok(ExitCode::NotFound);
            }
            let stats = index.stats();
            println!("Elements:     {}", stats.elements);
            println!("Services:     {}", stats.services);
            println!("Parameters:   {}", stats.parameters);
            println!("Classes:      {}", stats.classes);
            println!("Templates:    {}", stats.templates);
            println!("Routes:       {}", stats.routes);
            println!("Translations: {}", stats.translations);
            Ok(ExitCode::Success)
        }

        Commands::Service { id } => {
            let index = load_index(cli.index.as_deref(), &settings)?;
            let project = Project::new(&index, &settings);
            let container = project.container();

            let summary = container.resolve_service(&id).map(|class| {
                match container.resolved_class(&class) {
                    Some(info) => format!(
                        "{class}\n{}",
                        constructor_summary(&index, &info, settings.container.max_parent_depth)
                    ),
                    None => class,
                }
            });
            Ok(answer(summary))
        }

        Commands::Parameter { key } => {
            let index = load_index(cli.index.as_deref(), &settings)?;
            let project = Project::new(&index, &settings);
            Ok(answer(project.container().resolve_parameter(&key)))
        }

        Commands::Goto {
            document,
            offset,
            json,
        } => {
            let index = load_index(cli.index.as_deref(), &settings)?;
            let document = Document::load(&document)?;
            let token = document.require_token_at(offset)?;
            let project = Project::new(&index, &settings);

            let Some(targets) = producers::goto_declaration(&project, token) else {
                eprintln!("No declaration found for '{}'", token.text());
                return Ok(ExitCode::NotFound);
            };

            if json {
                let output = GotoOutput {
                    offset,
                    token: token.text(),
                    targets: &targets,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if targets.is_empty() {
                println!("'{}' resolves to nothing navigable", token.text());
            } else {
                for target in &targets {
                    println!("{target}");
                }
            }
            Ok(ExitCode::Success)
        }

        Commands::Overlay { document, offset } => {
            let index = load_index(cli.index.as_deref(), &settings)?;
            let document = Document::load(&document)
                .context("Failed to load syntax document")?;
            let project = Project::new(&index, &settings);
            let text = producers::caret_overlay(&project, &document, offset).map(|o| o.text);
            Ok(answer(text))
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = match e.downcast_ref::<IndexError>() {
                Some(error) => {
                    for suggestion in error.recovery_suggestions() {
                        eprintln!("  - {suggestion}");
                    }
                    ExitCode::from_error(error)
                }
                None => ExitCode::GeneralError,
            };
            code.into()
        }
    }
}

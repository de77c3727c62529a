use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codesurface::cli::CommandContext;
use codesurface::cli::commands::{analyze, config, evidence};
use codesurface::cli::ui::OutputFormat;

/// Parse output format from string
fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

/// Parse a positive token budget
fn parse_budget(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Token budget must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid token budget '{}'", s)),
    }
}

#[derive(Parser)]
#[command(name = "codesurface")]
#[command(
    version,
    about = "Static extraction of a repository's user-facing surface"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Use this config file instead of the global/repository lookup")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the technical model (screens, navigation, APIs, data model, state, events)
    Analyze {
        #[arg(help = "Repository root (default: current directory)")]
        path: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "json",
            value_parser = parse_format,
            help = "Output format: json, yaml, text"
        )]
        format: OutputFormat,
    },

    /// Collect evidence documents and chunk them to a token budget
    Evidence {
        #[arg(help = "Repository root (default: current directory)")]
        path: Option<PathBuf>,
        #[arg(long, help = "Uploaded brief to include with top priority")]
        brief: Option<PathBuf>,
        #[arg(long, value_parser = parse_budget, help = "Token budget override")]
        budget: Option<usize>,
        #[arg(
            short = 'f',
            long,
            default_value = "json",
            value_parser = parse_format,
            help = "Output format: json, yaml, text"
        )]
        format: OutputFormat,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(help = "Repository root (default: current directory)")]
        path: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            value_parser = parse_format,
            help = "Output format: toml, json"
        )]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path {
        #[arg(help = "Repository root (default: current directory)")]
        path: Option<PathBuf>,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcodesurface encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // stdout carries the extracted output; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Analyze { path, format } => {
            let ctx = CommandContext::load(path, config_file)?;
            analyze::run(&ctx, format)?;
        }
        Commands::Evidence {
            path,
            brief,
            budget,
            format,
        } => {
            let ctx = CommandContext::load(path, config_file)?;
            evidence::run(
                &ctx,
                evidence::EvidenceArgs {
                    brief,
                    budget,
                    format,
                },
            )?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { path, format } => {
                let ctx = CommandContext::load(path, config_file)?;
                config::show(&ctx, format)?;
            }
            ConfigAction::Path { path } => {
                let ctx = CommandContext::load(path, config_file)?;
                config::path(&ctx)?;
            }
        },
    }

    Ok(())
}

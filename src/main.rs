//! rbook - build runbooks from the command line.
//!
//! Appends steps to a runbook, and optionally runs it and writes the
//! captured results.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rbook::sandbox::RunOptions;
use rbook::{author_runbook, AuthorOptions, Config, InputSource, ProcessEngine, RunContext};

/// Build runbooks from the command line, optionally run them and capture the results
#[derive(Parser)]
#[command(name = "rbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new runbook or append a step to a runbook
    #[command(visible_alias = "append")]
    New(NewArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show config directory path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
struct NewArgs {
    /// Step arguments; without them, one step is read per line from stdin.
    /// Put step arguments that start with `-` after `--`
    #[arg(value_name = "STEP")]
    args: Vec<String>,

    /// Description of the runbook
    #[arg(long, value_name = "TEXT")]
    desc: Option<String>,

    /// Runbook file to create or append to (stdout when omitted)
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Run the runbook and write the captured results instead
    #[arg(long)]
    and_run: bool,

    /// Disable TLS for gRPC steps
    #[arg(long)]
    grpc_no_tls: bool,

    /// Proto file for gRPC steps (repeatable)
    #[arg(long = "grpc-proto", value_name = "FILE", value_delimiter = ',')]
    grpc_protos: Vec<String>,

    /// Proto import path for gRPC steps (repeatable)
    #[arg(long = "grpc-import-path", value_name = "DIR", value_delimiter = ',')]
    grpc_import_paths: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::New(args) => cmd_new(&load_config(cli.config.as_deref())?, args)?,
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Config { path } => cmd_config(cli.config.as_deref(), path)?,
    }

    Ok(())
}

/// Load the configuration from `--config` or the default locations.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    Ok(config.with_env_overrides())
}

/// Create a runbook or append to one.
fn cmd_new(config: &Config, args: NewArgs) -> Result<()> {
    let source = InputSource::detect(args.args, io::stdin().is_terminal());

    let opts = AuthorOptions {
        desc: args.desc,
        out: args.out,
        and_run: args.and_run,
        run: RunOptions {
            prefix: config.sandbox.prefix.clone(),
            merge_order: config.sandbox.merge_order,
            grpc_no_tls: args.grpc_no_tls,
            grpc_protos: args.grpc_protos,
            grpc_import_paths: args.grpc_import_paths,
        },
    };

    let engine = ProcessEngine::new(config.engine_program(), config.engine.args.clone());
    let ctx = RunContext::new();
    if opts.and_run {
        let handle = ctx.clone();
        ctrlc::set_handler(move || handle.cancel())?;
    }

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    match author_runbook(&opts, source, stdin, &engine, &ctx, &mut stdout) {
        Ok(report) => {
            tracing::debug!(?report, "Done");
            Ok(())
        }
        Err(e) if e.is_release_failure() => {
            tracing::warn!("Runbook was built, but the output could not be released");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "rbook", &mut io::stdout());
}

/// Show configuration.
fn cmd_config(config_path: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = load_config(config_path)?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

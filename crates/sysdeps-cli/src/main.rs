//! # sysdeps-cli
//!
//! Resolves Maven dependencies against the descriptors and jars installed on
//! the local system, without network access.
//!
//! This is the entry point of the `sysdeps` binary. It parses the command
//! line, sets up logging, loads the layered configuration and dispatches to
//! the command handlers.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use sysdeps_config::CliOverrides;
use sysdeps_core::{SysdepsError, SysdepsResult};
use tracing::{debug, error};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Offline Maven dependency resolution against locally installed artifacts
#[derive(Parser)]
#[command(name = "sysdeps", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Descriptor (POM) root; the first one given is the primary root
    #[arg(long = "poms", value_name = "DIR", global = true)]
    pub poms: Vec<PathBuf>,

    /// Directory holding installed jars
    #[arg(long = "jars", value_name = "DIR", global = true)]
    pub jars: Vec<PathBuf>,

    /// How deep to search jar directories
    #[arg(long, value_name = "N", global = true)]
    pub scan_depth: Option<usize>,

    /// Trust descriptors without checking that jars are installed
    #[arg(long, global = true)]
    pub no_verify: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a request manifest and/or ad-hoc dependencies
    Resolve {
        /// Request manifest (TOML)
        #[arg(short, long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Extra dependency, group:artifact[:version]
        #[arg(long = "dep", value_name = "KEY")]
        deps: Vec<String>,
        /// Extra BOM to import, group:artifact
        #[arg(long = "bom", value_name = "KEY")]
        boms: Vec<String>,
        /// Plugin id to map to its implementation module
        #[arg(long = "plugin", value_name = "ID")]
        plugins: Vec<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the descriptor index and list it
    Index {
        /// Only list this group
        #[arg(long)]
        group: Option<String>,
    },
    /// Show the best installed coordinate for group:artifact
    Find { group: String, artifact: String },
    /// Show what a descriptor declares after inheritance and interpolation
    Deps { pom: PathBuf },
    /// Map plugin ids to installed implementation modules
    Plugins {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show version information
    Version,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            poms: self.poms.clone(),
            jars: self.jars.clone(),
            scan_depth: self.scan_depth,
            verify_artifacts: self.no_verify.then_some(false),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(&cli);
    setup_panic_handler();

    debug!("Starting sysdeps v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> SysdepsResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| SysdepsError::io("Failed to create async runtime", e))?;

    let overrides = cli.overrides();
    rt.block_on(async move {
        let ctx = CommandContext::new(&overrides).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "sysdeps={level},sysdeps_core={level},sysdeps_config={level},\
             sysdeps_repository={level},sysdeps_resolver={level},sysdeps_artifacts={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("sysdeps encountered an unexpected error: {}", panic_info);
        eprintln!("sysdeps crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}

//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no I/O happens here.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, ValueEnum};

use neutron_bench_core::config::LOG_LEVELS;

/// neutron-bench -- Neutron BGP-VPN benchmark scenarios.
///
/// Use `neutron-bench <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "neutron-bench", version, about, long_about = None)]
pub struct Cli {
    /// Path to the neutron-bench.toml configuration file.
    #[arg(short, long, default_value = "neutron-bench.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true, value_parser = PossibleValuesParser::new(LOG_LEVELS))]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect registered scenarios.
    Scenarios(ScenariosArgs),

    /// Manage configuration.
    Config(ConfigArgs),

    /// Run every workload of a task file.
    Run(RunArgs),
}

// ---- scenarios ----

#[derive(Args, Debug)]
pub struct ScenariosArgs {
    #[command(subcommand)]
    pub action: ScenariosAction,
}

#[derive(Subcommand, Debug)]
pub enum ScenariosAction {
    /// List registered scenarios.
    List,
    /// Show validators and cleanup contexts of one scenario.
    Show {
        /// Registered name, e.g. NeutronBGPVPN.create_and_delete_bgpvpns
        name: String,
    },
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Load and validate the configuration file.
    Validate,
    /// Show the effective configuration with passwords redacted.
    Show {
        /// Only this section (general, openstack).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- run ----

/// Authenticate, discover platform facts and run a task file.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task file (TOML) listing the workloads.
    pub task: PathBuf,
}

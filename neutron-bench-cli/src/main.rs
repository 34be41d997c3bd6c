//! neutron-bench -- command-line runner for Neutron BGP-VPN benchmark scenarios.
//!
//! ```text
//! neutron-bench scenarios list
//! neutron-bench scenarios show NeutronBGPVPN.create_and_list_bgpvpns
//! neutron-bench config validate
//! neutron-bench -c neutron-bench.toml run tasks/bgpvpn.toml --output json
//! ```

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;
use tracing::error;

use neutron_bench_core::config::BenchConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging follows the config file when it loads; `config validate`
    // still needs to run (and report) when it does not.
    let loaded = BenchConfig::load(&cli.config).await;
    let mut general = loaded
        .as_ref()
        .map(|config| config.general.clone())
        .unwrap_or_default();
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }

    let writer = OutputWriter::new(cli.output);
    let result: Result<(), CliError> = match cli.command {
        Commands::Scenarios(args) => commands::scenarios::execute(args, &writer),
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::Run(args) => match loaded {
            Ok(config) => commands::run::execute(args, &config, &writer).await,
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        let code = e.exit_code();
        error!(error = %e, exit_code = code, "command failed");
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(code);
    }
}

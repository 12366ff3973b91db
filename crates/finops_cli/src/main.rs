//! FinOps CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Invalid usage input
//! - 4: Configuration error

use std::process::ExitCode;

use clap::Parser;
use finops_pricing::PricingError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const INVALID_INPUT: u8 = 3;
    pub const CONFIG_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Usage(args) => commands::usage::execute(args),
        Commands::Prices(args) => commands::prices::execute(args),
        Commands::Costs(args) => commands::costs::execute(args),
        Commands::Forecast(args) => commands::forecast::execute(args),
        Commands::Config(args) => commands::config::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Install the tracing subscriber. Logs go to stderr.
fn init_logging(cli: &Cli) {
    let env_filter = if cli.verbose {
        EnvFilter::new("finops=debug,info")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finops=info,warn"))
    };

    let fmt_layer = if cli.log_json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    // Already initialized in tests; nothing to do then.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    let Some(pricing) = e.chain().find_map(|cause| cause.downcast_ref::<PricingError>()) else {
        return ExitCodes::GENERAL_ERROR;
    };

    match pricing {
        PricingError::InvalidInput { .. } => ExitCodes::INVALID_INPUT,
        PricingError::Io(_) => ExitCodes::GENERAL_ERROR,
        PricingError::UnsupportedFormat(_) => ExitCodes::INVALID_ARGS,
        PricingError::MalformedTierTable { .. }
        | PricingError::UnknownTierTable { .. }
        | PricingError::InvalidConfiguration(_)
        | PricingError::Yaml(_)
        | PricingError::Toml(_)
        | PricingError::TomlSerialize(_) => ExitCodes::CONFIG_ERROR,
    }
}

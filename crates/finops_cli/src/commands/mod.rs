//! CLI command definitions.
//!
//! This module defines the command structure for the FinOps CLI.
//! Each subcommand renders one view of the pricing engine.

use clap::{Parser, Subcommand, ValueEnum};

pub mod config;
pub mod costs;
pub mod forecast;
pub mod inputs;
pub mod prices;
pub mod usage;

/// finops - usage-based billing and cost forecasting
#[derive(Parser)]
#[command(name = "finops")]
#[command(version, about = "finops - usage-based billing and cost forecasting")]
#[command(long_about = r#"
finops prices recorded usage against contracted limits and projects the cost
of planned volumes.

COMMANDS:
  usage     → Spend against limits, monthly or yearly
  prices    → List and discounted unit prices, tier tables
  costs     → Per-metric cost breakdown and grand total
  forecast  → What-if costs for planned volumes
  config    → Print the effective pricing configuration

Without --config / --usage the built-in deployment data is used.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Invalid usage input
  4 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show spend against limits
    Usage(usage::UsageArgs),

    /// Show the price sheet
    Prices(prices::PricesArgs),

    /// Calculate costs for recorded usage
    Costs(costs::CostsArgs),

    /// Forecast costs for planned volumes
    Forecast(forecast::ForecastArgs),

    /// Print the effective pricing configuration
    Config(config::ConfigArgs),
}

/// Report rendering.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

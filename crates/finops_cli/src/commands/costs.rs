//! Costs command - Price recorded usage.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use finops_pricing::{format_money, CalculationResult, Period, PricingEngine};

use super::inputs::{ConfigSource, UsageSource};
use super::OutputFormat;

#[derive(Args)]
pub struct CostsArgs {
    #[command(flatten)]
    usage: UsageSource,

    #[command(flatten)]
    config: ConfigSource,

    /// Reporting period (monthly or yearly)
    #[arg(short, long, default_value_t = Period::Monthly)]
    period: Period,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

pub fn execute(args: CostsArgs) -> Result<()> {
    let config = args.config.load()?;
    let sheet = args.usage.load()?.view(args.period, &config);
    let engine = PricingEngine::new(&config).context("Failed to build pricing engine")?;

    let result = engine.calculate(&sheet).context("Cost calculation failed")?;
    info!("Calculated {} costs", args.period);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print!("{}", render_text(&result, args.period)),
    }

    Ok(())
}

fn render_text(result: &CalculationResult, period: Period) -> String {
    let mut out = format!("Costs ({})\n", period);
    for line in &result.lines {
        out.push_str(&format!("\n{} ({})\n", line.metric, line.policy));
        for detail in line.describe() {
            out.push_str(&format!("  {}\n", detail));
        }
    }
    out.push_str(&format!("\nTotal: {}\n", format_money(result.total)));
    out.push_str(&format!(
        "Generated at {}\n",
        result.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

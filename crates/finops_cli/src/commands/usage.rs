//! Usage command - Show spend against contracted limits.

use anyhow::Result;
use clap::Args;
use tracing::info;

use finops_pricing::{format_quantity, MetricUsage, Period};

use super::inputs::{ConfigSource, UsageSource};

const BAR_WIDTH: usize = 20;

#[derive(Args)]
pub struct UsageArgs {
    #[command(flatten)]
    usage: UsageSource,

    #[command(flatten)]
    config: ConfigSource,

    /// Reporting period (monthly or yearly)
    #[arg(short, long, default_value_t = Period::Monthly)]
    period: Period,
}

pub fn execute(args: UsageArgs) -> Result<()> {
    let config = args.config.load()?;
    let sheet = args.usage.load()?.view(args.period, &config);
    info!("Showing {} usage for {} metrics", args.period, sheet.len());

    println!("Usage overview ({})", args.period);
    println!();
    println!(
        "{:<20} {:>12} {:>12} {:>6}  {}",
        "Metric", "Spend", "Limit", "Used", "Progress"
    );
    for usage in sheet.iter() {
        println!("{}", usage_row(usage));
    }

    let over: Vec<_> = sheet.iter().filter(|u| u.is_over_limit()).collect();
    if !over.is_empty() {
        println!();
        for usage in over {
            println!(
                "⚠️  {} is over its limit by {}",
                usage.metric,
                format_quantity(usage.spend - usage.limit)
            );
        }
    }

    Ok(())
}

fn usage_row(usage: &MetricUsage) -> String {
    let used = usage
        .utilization_percent()
        .map(|p| format!("{}%", p))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{:<20} {:>12} {:>12} {:>6}  {}",
        usage.metric,
        format_quantity(usage.spend),
        format_quantity(usage.limit),
        used,
        progress_bar(usage.progress_percent())
    )
}

fn progress_bar(percent: Option<f64>) -> String {
    let Some(percent) = percent else {
        return String::new();
    };
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

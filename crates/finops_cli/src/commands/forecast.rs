//! Forecast command - Project costs for planned volumes.

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Args;

use finops_pricing::{format_money, format_quantity, ForecastSummary, PricingEngine};

use super::inputs::{ConfigSource, UsageSource};
use super::OutputFormat;

#[derive(Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    usage: UsageSource,

    #[command(flatten)]
    config: ConfigSource,

    /// Planned volume as METRIC=N (repeatable); other metrics forecast at 0
    #[arg(long = "volume", value_name = "METRIC=N", value_parser = parse_volume)]
    volumes: Vec<(String, f64)>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

pub fn execute(args: ForecastArgs) -> Result<()> {
    let config = args.config.load()?;
    let sheet = args.usage.load()?;
    let engine = PricingEngine::new(&config).context("Failed to build pricing engine")?;

    let mut volumes = HashMap::with_capacity(args.volumes.len());
    for (metric, volume) in args.volumes {
        if volumes.insert(metric.clone(), volume).is_some() {
            anyhow::bail!("Volume for '{}' given more than once", metric);
        }
    }

    let summary = engine.forecast_all(&sheet, &volumes).context("Forecast failed")?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", render_text(&summary)),
    }

    Ok(())
}

/// Parse `METRIC=N`. Metric names may contain spaces but not `=`.
fn parse_volume(raw: &str) -> Result<(String, f64), String> {
    let (metric, volume) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected METRIC=N, got '{}'", raw))?;
    let metric = metric.trim();
    if metric.is_empty() {
        return Err(format!("missing metric name in '{}'", raw));
    }
    let volume: f64 = volume
        .trim()
        .parse()
        .map_err(|_| format!("invalid volume '{}' for '{}'", volume.trim(), metric))?;
    if !volume.is_finite() || volume < 0.0 {
        return Err(format!("volume for '{}' must be a non-negative number", metric));
    }
    Ok((metric.to_string(), volume))
}

fn render_text(summary: &ForecastSummary) -> String {
    let mut out = String::from("Forecast\n\n");
    for line in &summary.lines {
        let note = if line.fixed { "  (fixed fee)" } else { "" };
        out.push_str(&format!(
            "{:<20} {:>12} × {:>9} = {:>14}{}\n",
            line.metric,
            format_quantity(line.volume),
            format_money(line.unit_rate),
            format_money(line.cost),
            note
        ));
    }
    out.push_str(&format!("\nTotal: {}\n", format_money(summary.total)));
    out.push_str(&format!(
        "Generated at {}\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use finops_pricing::UsageSheet;

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("PPU=25000").unwrap(), ("PPU".to_string(), 25000.0));
        assert_eq!(
            parse_volume("Snowflake credits = 4200.5").unwrap(),
            ("Snowflake credits".to_string(), 4200.5)
        );
        assert!(parse_volume("PPU").is_err());
        assert!(parse_volume("=5").is_err());
        assert!(parse_volume("PPU=lots").is_err());
        assert!(parse_volume("PPU=-1").is_err());
        assert!(parse_volume("PPU=inf").is_err());
    }

    #[test]
    fn test_render_forecast() {
        let engine = PricingEngine::deployment_default().unwrap();
        let volumes = HashMap::from([("PPU".to_string(), 25_000.0)]);
        let summary = engine
            .forecast_all(&UsageSheet::deployment_default(), &volumes)
            .unwrap();
        let text = render_text(&summary);

        assert!(text.contains("$20,000.00"));
        assert!(text.contains("(fixed fee)"));
        assert!(text.contains(&format!("Total: {}", format_money(summary.total))));
    }
}

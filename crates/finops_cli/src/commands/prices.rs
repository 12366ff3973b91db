//! Prices command - Show list and discounted prices and the tier tables.

use anyhow::Result;
use clap::Args;

use finops_pricing::{format_money, PricingConfig, TierTable, UsageSheet};

use super::inputs::{ConfigSource, UsageSource};

#[derive(Args)]
pub struct PricesArgs {
    #[command(flatten)]
    usage: UsageSource,

    #[command(flatten)]
    config: ConfigSource,
}

pub fn execute(args: PricesArgs) -> Result<()> {
    let config = args.config.load()?;
    let sheet = args.usage.load()?;

    print!("{}", render_text(&sheet, &config));

    Ok(())
}

fn render_text(sheet: &UsageSheet, config: &PricingConfig) -> String {
    let mut out = render_unit_prices(sheet);
    out.push_str(&render_overage_prices(config));
    for table in &config.tier_tables {
        out.push('\n');
        out.push_str(&render_tier_table(table));
    }
    out
}

fn render_unit_prices(sheet: &UsageSheet) -> String {
    let mut out = String::from("Unit prices\n\n");
    out.push_str(&format!(
        "{:<20} {:>12} {:>12} {:>9}\n",
        "Metric", "List", "Discounted", "Discount"
    ));
    for usage in sheet.iter() {
        out.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>8.0}%\n",
            usage.metric,
            format_money(usage.list_unit_cost),
            format_money(usage.unit_cost),
            usage.discount_fraction() * 100.0
        ));
    }
    out
}

fn render_overage_prices(config: &PricingConfig) -> String {
    let priced: Vec<_> = config
        .metrics
        .iter()
        .filter_map(|m| m.overage_list_price.map(|price| (m.id.as_str(), price)))
        .collect();
    if priced.is_empty() {
        return String::new();
    }

    let mut out = String::from("\nOver-consumption list prices\n\n");
    for (metric, price) in priced {
        out.push_str(&format!("{:<20} {:>12}\n", metric, format_money(price)));
    }
    out
}

fn render_tier_table(table: &TierTable) -> String {
    let mut out = format!("Tier table '{}'\n\n", table.name());
    out.push_str(&format!("{:<16} {:>9} {:>12}\n", "Volume", "Discount", "Unit price"));
    for tier in table.tiers() {
        out.push_str(&format!(
            "{:<16} {:>8.0}% {:>12}\n",
            tier.label(),
            tier.discount_percent(),
            format_money(tier.price)
        ));
    }
    out
}

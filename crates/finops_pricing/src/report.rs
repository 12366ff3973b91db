//! Human-readable rendering of amounts and cost breakdowns.

use crate::policy::{CostBreakdown, PolicyKind};
use crate::tiered::Segment;

/// Format a dollar amount with thousands separators and two decimals.
pub fn format_money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(int_part), frac_part)
}

/// Format a quantity: whole numbers without decimals, others with up to two.
pub fn format_quantity(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let value = value.abs();
    if value.fract() == 0.0 {
        return format!("{}{}", sign, group_thousands(&format!("{:.0}", value)));
    }

    let formatted = format!("{:.2}", value);
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn segment_line(segment: &Segment) -> String {
    format!(
        "{} × {} = {}",
        format_quantity(segment.quantity),
        format_money(segment.rate),
        format_money(segment.cost)
    )
}

impl CostBreakdown {
    /// Audit lines explaining how the total was reached.
    pub fn describe(&self) -> Vec<String> {
        if self.within_limit {
            return vec![segment_line(&self.within)];
        }

        match self.policy {
            PolicyKind::FixedFee => vec![format!("Fixed price: {}", format_money(self.total))],
            PolicyKind::Flat => vec![segment_line(&self.within)],
            PolicyKind::Tiered => vec![
                format!("Within limit: {}", segment_line(&self.within)),
                format!("Over limit: {}", segment_line(&self.over)),
                format!("Total: {}", format_money(self.total)),
            ],
            PolicyKind::Surcharge => {
                let markup = self
                    .surcharge_multiplier
                    .map(|m| ((m - 1.0) * 100.0).round())
                    .unwrap_or_default();
                vec![
                    format!("Within limit: {}", segment_line(&self.within)),
                    format!(
                        "Over limit: {} × {} ({}% surcharge) = {}",
                        format_quantity(self.over.quantity),
                        format_money(self.over.rate),
                        markup,
                        format_money(self.over.cost)
                    ),
                    format!("Total: {}", format_money(self.total)),
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PricingEngine;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(0.75), "$0.75");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(64250.0), "$64,250.00");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(-1500.5), "-$1,500.50");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(20000.0), "20,000");
        assert_eq!(format_quantity(130.0), "130");
        assert_eq!(format_quantity(2000.5), "2,000.5");
        assert_eq!(format_quantity(12.25), "12.25");
        assert_eq!(format_quantity(1_000_000.0), "1,000,000");
    }

    #[test]
    fn test_describe_surcharge() {
        let engine = PricingEngine::deployment_default().unwrap();
        let lines = engine.cost_for_metric("CS Mds", 20.0, 15.0, 5.0).describe();

        assert_eq!(lines[0], "Within limit: 15 × $5.00 = $75.00");
        assert_eq!(lines[1], "Over limit: 5 × $6.50 (30% surcharge) = $32.50");
        assert_eq!(lines[2], "Total: $107.50");
    }

    #[test]
    fn test_describe_tiered() {
        let engine = PricingEngine::deployment_default().unwrap();
        let lines = engine.cost_for_metric("Počet projektů", 150.0, 130.0, 377.0).describe();

        assert_eq!(lines[0], "Within limit: 130 × $425.00 = $55,250.00");
        assert_eq!(lines[1], "Over limit: 20 × $450.00 = $9,000.00");
        assert_eq!(lines[2], "Total: $64,250.00");
    }

    #[test]
    fn test_describe_under_limit_and_fixed_fee() {
        let engine = PricingEngine::deployment_default().unwrap();

        let lines = engine.cost_for_metric("PPU", 20000.0, 28000.0, 0.75).describe();
        assert_eq!(lines, vec!["20,000 × $0.75 = $15,000.00".to_string()]);

        let lines = engine.cost_for_metric("Premimum SLA", 20.0, 15.0, 10.0).describe();
        assert_eq!(lines, vec!["Fixed price: $200.00".to_string()]);
    }
}

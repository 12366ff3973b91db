//! Volume tier tables and unit rate resolution.
//!
//! A tier table maps contiguous volume bands to unit prices. Bands are
//! inclusive on both ends and contiguous at integer granularity, so
//! `[0, 2000]` followed by `[2001, 5000]` is well-formed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PricingError, PricingResult};

/// A single volume band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Inclusive lower bound
    pub min: f64,
    /// Inclusive upper bound, `None` for the top tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Discount against the base tier, as a fraction
    #[serde(default)]
    pub discount: f64,
    /// Unit price inside this band
    pub price: f64,
}

impl Tier {
    pub fn bounded(min: f64, max: f64, discount: f64, price: f64) -> Self {
        Self {
            min,
            max: Some(max),
            discount,
            price,
        }
    }

    pub fn unbounded(min: f64, discount: f64, price: f64) -> Self {
        Self {
            min,
            max: None,
            discount,
            price,
        }
    }

    /// Check whether `volume` falls inside this band.
    pub fn contains(&self, volume: f64) -> bool {
        volume >= self.min && self.max.map_or(true, |max| volume <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Range label such as `6-10` or `26+`.
    pub fn label(&self) -> String {
        match self.max {
            Some(max) => format!("{}-{}", self.min, max),
            None => format!("{}+", self.min),
        }
    }

    /// Discount as a whole percentage.
    pub fn discount_percent(&self) -> f64 {
        self.discount * 100.0
    }
}

/// A named, validated, ascending set of tiers.
///
/// Every constructor validates, including deserialization, so a `TierTable`
/// value is always well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TierTableDef")]
pub struct TierTable {
    name: String,
    tiers: Vec<Tier>,
}

#[derive(Deserialize)]
struct TierTableDef {
    name: String,
    tiers: Vec<Tier>,
}

impl TryFrom<TierTableDef> for TierTable {
    type Error = PricingError;

    fn try_from(def: TierTableDef) -> PricingResult<Self> {
        TierTable::new(def.name, def.tiers)
    }
}

impl TierTable {
    pub const PROJECTS: &'static str = "projects";
    pub const PPU: &'static str = "ppu";

    /// Build a table, rejecting anything that is not well-formed.
    pub fn new(name: impl Into<String>, tiers: Vec<Tier>) -> PricingResult<Self> {
        let table = Self {
            name: name.into(),
            tiers,
        };
        table.validate()?;
        Ok(table)
    }

    /// Project count pricing: 500 / 475 / 450 / 425 per project.
    pub fn projects() -> Self {
        Self {
            name: Self::PROJECTS.to_string(),
            tiers: vec![
                Tier::bounded(0.0, 5.0, 0.00, 500.0),
                Tier::bounded(6.0, 10.0, 0.05, 475.0),
                Tier::bounded(11.0, 25.0, 0.10, 450.0),
                Tier::unbounded(26.0, 0.15, 425.0),
            ],
        }
    }

    /// Per-unit usage pricing, from 1.00 down to 0.80 per unit.
    pub fn ppu() -> Self {
        Self {
            name: Self::PPU.to_string(),
            tiers: vec![
                Tier::bounded(0.0, 2000.0, 0.00, 1.00),
                Tier::bounded(2001.0, 5000.0, 0.05, 0.95),
                Tier::bounded(5001.0, 10000.0, 0.10, 0.90),
                Tier::bounded(10001.0, 20000.0, 0.15, 0.85),
                Tier::unbounded(20001.0, 0.20, 0.80),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// The band with the greatest lower bound.
    pub fn top_tier(&self) -> &Tier {
        // Non-empty and sorted ascending by construction.
        &self.tiers[self.tiers.len() - 1]
    }

    /// Find the band containing `volume`.
    ///
    /// Volumes outside every band (below the first minimum, or inside a
    /// fractional gap between integer bounds) resolve to the top tier.
    pub fn tier_for(&self, volume: f64) -> &Tier {
        if let Some(tier) = self.tiers.iter().find(|t| t.contains(volume)) {
            return tier;
        }

        let top = self.top_tier();
        debug!(
            table = %self.name,
            volume,
            fallback_min = top.min,
            "No tier contains volume, using top tier"
        );
        top
    }

    /// Check the table invariants.
    pub fn validate(&self) -> PricingResult<()> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(PricingError::malformed(name, "table name is empty"));
        }
        if self.tiers.is_empty() {
            return Err(PricingError::malformed(name, "table has no tiers"));
        }

        for tier in &self.tiers {
            if !tier.min.is_finite() || tier.min < 0.0 {
                return Err(PricingError::malformed(
                    name,
                    format!("tier minimum {} must be a non-negative number", tier.min),
                ));
            }
            if let Some(max) = tier.max {
                if !max.is_finite() || max < tier.min {
                    return Err(PricingError::malformed(
                        name,
                        format!("tier {} has an upper bound below its minimum", tier.label()),
                    ));
                }
            }
            if !tier.price.is_finite() || tier.price < 0.0 {
                return Err(PricingError::malformed(
                    name,
                    format!("tier {} has invalid price {}", tier.label(), tier.price),
                ));
            }
            if !(0.0..1.0).contains(&tier.discount) {
                return Err(PricingError::malformed(
                    name,
                    format!("tier {} discount must be in [0, 1)", tier.label()),
                ));
            }
        }

        for pair in self.tiers.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let Some(prev_max) = prev.max else {
                return Err(PricingError::malformed(
                    name,
                    format!("unbounded tier {} is not the last tier", prev.label()),
                ));
            };
            if next.min <= prev_max {
                return Err(PricingError::malformed(
                    name,
                    format!("tier {} overlaps tier {}", next.label(), prev.label()),
                ));
            }
            if next.min > prev_max + 1.0 {
                return Err(PricingError::malformed(
                    name,
                    format!("gap between tier {} and tier {}", prev.label(), next.label()),
                ));
            }
        }

        if !self.top_tier().is_unbounded() {
            return Err(PricingError::malformed(name, "last tier must be unbounded"));
        }

        Ok(())
    }
}

/// Unit price for `volume` under `table`.
pub fn resolve_rate(volume: f64, table: &TierTable) -> f64 {
    table.tier_for(volume).price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_well_formed() {
        let projects = TierTable::projects();
        assert!(TierTable::new(projects.name(), projects.tiers().to_vec()).is_ok());

        let ppu = TierTable::ppu();
        assert!(TierTable::new(ppu.name(), ppu.tiers().to_vec()).is_ok());
    }

    #[test]
    fn test_resolve_rate_inclusive_bounds() {
        let table = TierTable::projects();
        assert_eq!(resolve_rate(0.0, &table), 500.0);
        assert_eq!(resolve_rate(5.0, &table), 500.0);
        assert_eq!(resolve_rate(6.0, &table), 475.0);
        assert_eq!(resolve_rate(10.0, &table), 475.0);
        assert_eq!(resolve_rate(20.0, &table), 450.0);
        assert_eq!(resolve_rate(25.0, &table), 450.0);
        assert_eq!(resolve_rate(26.0, &table), 425.0);
        assert_eq!(resolve_rate(130.0, &table), 425.0);
    }

    #[test]
    fn test_resolve_rate_ppu() {
        let table = TierTable::ppu();
        assert_eq!(resolve_rate(2000.0, &table), 1.00);
        assert_eq!(resolve_rate(2001.0, &table), 0.95);
        assert_eq!(resolve_rate(20000.0, &table), 0.85);
        assert_eq!(resolve_rate(28000.0, &table), 0.80);
    }

    #[test]
    fn test_fractional_gap_falls_back_to_top_tier() {
        let table = TierTable::ppu();
        assert_eq!(resolve_rate(2000.5, &table), 0.80);
        assert_eq!(table.tier_for(5.5).price, 1.00);
    }

    #[test]
    fn test_volume_below_first_tier_falls_back_to_top_tier() {
        let table = TierTable::new(
            "starts-at-ten",
            vec![
                Tier::bounded(10.0, 19.0, 0.0, 3.0),
                Tier::unbounded(20.0, 0.1, 2.0),
            ],
        )
        .unwrap();

        assert_eq!(resolve_rate(0.0, &table), 2.0);
        assert_eq!(resolve_rate(10.0, &table), 3.0);
    }

    #[test]
    fn test_matched_tier_contains_volume() {
        let table = TierTable::ppu();
        for volume in [0.0, 1.0, 1999.0, 2001.0, 4999.0, 7500.0, 10001.0, 50000.0] {
            assert!(table.tier_for(volume).contains(volume), "volume {}", volume);
        }
    }

    #[test]
    fn test_rejects_empty_table() {
        let err = TierTable::new("empty", vec![]).unwrap_err();
        assert!(matches!(err, PricingError::MalformedTierTable { .. }));
    }

    #[test]
    fn test_rejects_overlap() {
        let result = TierTable::new(
            "overlap",
            vec![
                Tier::bounded(0.0, 10.0, 0.0, 1.0),
                Tier::unbounded(10.0, 0.0, 0.9),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_gap() {
        let result = TierTable::new(
            "gap",
            vec![
                Tier::bounded(0.0, 10.0, 0.0, 1.0),
                Tier::unbounded(15.0, 0.0, 0.9),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bounded_top_tier() {
        let result = TierTable::new("capped", vec![Tier::bounded(0.0, 10.0, 0.0, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unbounded_tier_in_the_middle() {
        let result = TierTable::new(
            "middle",
            vec![
                Tier::unbounded(0.0, 0.0, 1.0),
                Tier::unbounded(11.0, 0.0, 0.9),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_negative_price_and_bad_discount() {
        assert!(TierTable::new("neg", vec![Tier::unbounded(0.0, 0.0, -1.0)]).is_err());
        assert!(TierTable::new("disc", vec![Tier::unbounded(0.0, 1.5, 1.0)]).is_err());
    }

    #[test]
    fn test_deserialization_validates() {
        let yaml = r#"
name: broken
tiers:
  - { min: 0, max: 5, price: 10 }
  - { min: 3, price: 9 }
"#;
        let result: Result<TierTable, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());

        let yaml = r#"
name: fine
tiers:
  - { min: 0, max: 5, price: 10 }
  - { min: 6, discount: 0.1, price: 9 }
"#;
        let table: TierTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.tiers().len(), 2);
        assert_eq!(resolve_rate(7.0, &table), 9.0);
    }

    #[test]
    fn test_tier_labels() {
        let table = TierTable::projects();
        let labels: Vec<_> = table.tiers().iter().map(Tier::label).collect();
        assert_eq!(labels, vec!["0-5", "6-10", "11-25", "26+"]);
        assert_eq!(table.tiers()[1].discount_percent().round(), 5.0);
    }
}

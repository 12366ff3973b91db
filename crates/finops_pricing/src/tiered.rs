//! Tiered cost calculation split at a contracted limit.
//!
//! The within-limit portion is priced at the rate of the tier the limit
//! falls into. The overage is priced as a separate purchase: it re-enters
//! the table with its own size as the volume.

use serde::{Deserialize, Serialize};

use crate::tier::{resolve_rate, TierTable};

/// A priced quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub quantity: f64,
    pub rate: f64,
    pub cost: f64,
}

impl Segment {
    pub fn priced(quantity: f64, rate: f64) -> Self {
        Self {
            quantity,
            rate,
            cost: quantity * rate,
        }
    }

    /// Zero quantity at zero rate.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0.0
    }
}

/// Within-limit and over-limit segments of a tiered calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieredSplit {
    pub within: Segment,
    pub over: Segment,
}

impl TieredSplit {
    pub fn total(&self) -> f64 {
        self.within.cost + self.over.cost
    }
}

/// Split `spend` at `limit` and price both segments from `table`.
pub fn tiered_breakdown(spend: f64, limit: f64, table: &TierTable) -> TieredSplit {
    debug_assert!(spend >= 0.0 && limit >= 0.0, "spend and limit must be non-negative");

    let within = Segment::priced(spend.min(limit), resolve_rate(limit, table));
    let over = if spend > limit {
        let overage = spend - limit;
        Segment::priced(overage, resolve_rate(overage, table))
    } else {
        Segment::none()
    };

    TieredSplit { within, over }
}

/// Total tiered cost of `spend` against `limit`.
pub fn tiered_cost(spend: f64, limit: f64, table: &TierTable) -> f64 {
    tiered_breakdown(spend, limit, table).total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_projects_over_limit() {
        let table = TierTable::projects();
        let split = tiered_breakdown(150.0, 130.0, &table);

        assert_eq!(split.within.quantity, 130.0);
        assert_eq!(split.within.rate, 425.0);
        assert!(approx_eq(split.within.cost, 55250.0));
        assert_eq!(split.over.quantity, 20.0);
        assert_eq!(split.over.rate, 450.0);
        assert!(approx_eq(split.over.cost, 9000.0));
        assert!(approx_eq(tiered_cost(150.0, 130.0, &table), 64250.0));
    }

    #[test]
    fn test_under_limit_uses_rate_at_limit() {
        let table = TierTable::projects();
        // 4 projects against a limit of 8 are priced at the 6-10 band.
        assert!(approx_eq(tiered_cost(4.0, 8.0, &table), 4.0 * 475.0));

        for spend in [0.0, 1.0, 7.0, 8.0] {
            let expected = spend * resolve_rate(8.0, &table);
            assert!(approx_eq(tiered_cost(spend, 8.0, &table), expected));
        }
    }

    #[test]
    fn test_no_overage_segment_at_limit() {
        let split = tiered_breakdown(130.0, 130.0, &TierTable::projects());
        assert!(split.over.is_empty());
        assert_eq!(split.over.cost, 0.0);
    }

    #[test]
    fn test_ppu_overage_priced_by_overage_size() {
        let table = TierTable::ppu();
        let split = tiered_breakdown(31000.0, 28000.0, &table);

        assert_eq!(split.within.rate, 0.80);
        assert_eq!(split.over.quantity, 3000.0);
        assert_eq!(split.over.rate, 0.95);
        assert!(approx_eq(split.total(), 28000.0 * 0.80 + 3000.0 * 0.95));
    }

    #[test]
    fn test_non_decreasing_in_spend() {
        // Band edges priced so that quantity * rate never drops across a boundary.
        let table = TierTable::new(
            "gentle",
            vec![
                Tier::bounded(0.0, 9.0, 0.0, 10.0),
                Tier::bounded(10.0, 99.0, 0.05, 9.5),
                Tier::unbounded(100.0, 0.055, 9.45),
            ],
        )
        .unwrap();

        let limit = 40.0;
        let mut previous = 0.0;
        for step in 0..=300 {
            let spend = step as f64;
            let cost = tiered_cost(spend, limit, &table);
            assert!(cost >= previous, "cost dropped at spend {}", spend);
            previous = cost;
        }
    }

    #[test]
    fn test_overage_cost_dips_at_discount_boundary() {
        // A 26-project overage is cheaper than a 25-project one under the
        // default volume discounts.
        let table = TierTable::projects();
        let at_25 = tiered_cost(155.0, 130.0, &table);
        let at_26 = tiered_cost(156.0, 130.0, &table);
        assert!(at_26 < at_25);
    }
}

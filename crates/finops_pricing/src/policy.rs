//! Metric pricing policies.
//!
//! Every metric is priced under one of four policies. While spend stays
//! within the limit all of them charge `spend * unit_cost`; they differ only
//! in how an overage is billed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tier::TierTable;
use crate::tiered::{tiered_breakdown, Segment};

/// Default markup on over-limit usage for surcharge-priced metrics.
pub const DEFAULT_SURCHARGE_MULTIPLIER: f64 = 1.3;

/// Pricing policy as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingPolicy {
    /// Spend times unit cost, limit ignored
    Flat,
    /// Volume tiers from the named table once over the limit
    Tiered { table: String },
    /// Fixed fee; the limit is informational only
    FixedFee,
    /// Unit cost within the limit, marked-up unit cost beyond it
    #[default]
    Surcharge,
}

impl PricingPolicy {
    pub fn tiered(table: impl Into<String>) -> Self {
        Self::Tiered {
            table: table.into(),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Flat => PolicyKind::Flat,
            Self::Tiered { .. } => PolicyKind::Tiered,
            Self::FixedFee => PolicyKind::FixedFee,
            Self::Surcharge => PolicyKind::Surcharge,
        }
    }
}

/// Policy tag without configuration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Flat,
    Tiered,
    FixedFee,
    Surcharge,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Flat => write!(f, "flat"),
            PolicyKind::Tiered => write!(f, "tiered"),
            PolicyKind::FixedFee => write!(f, "fixed fee"),
            PolicyKind::Surcharge => write!(f, "surcharge"),
        }
    }
}

/// Audit record of how one metric was priced.
///
/// Flat and fixed-fee metrics report their whole quantity in `within`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub metric: String,
    pub policy: PolicyKind,
    pub spend: f64,
    pub limit: f64,
    /// Spend did not exceed the limit, so flat pricing applied
    pub within_limit: bool,
    pub within: Segment,
    pub over: Segment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge_multiplier: Option<f64>,
    pub total: f64,
}

impl CostBreakdown {
    fn new(
        metric: &str,
        policy: PolicyKind,
        spend: f64,
        limit: f64,
        within: Segment,
        over: Segment,
        surcharge_multiplier: Option<f64>,
    ) -> Self {
        Self {
            metric: metric.to_string(),
            policy,
            spend,
            limit,
            within_limit: spend <= limit,
            within,
            over,
            surcharge_multiplier,
            total: within.cost + over.cost,
        }
    }
}

/// A policy with its tier table and multiplier bound, ready to price.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResolvedPolicy {
    Flat,
    Tiered(TierTable),
    FixedFee,
    Surcharge { multiplier: f64 },
}

impl ResolvedPolicy {
    pub(crate) fn kind(&self) -> PolicyKind {
        match self {
            Self::Flat => PolicyKind::Flat,
            Self::Tiered(_) => PolicyKind::Tiered,
            Self::FixedFee => PolicyKind::FixedFee,
            Self::Surcharge { .. } => PolicyKind::Surcharge,
        }
    }

    pub(crate) fn price(&self, metric: &str, spend: f64, limit: f64, unit_cost: f64) -> CostBreakdown {
        debug_assert!(
            spend >= 0.0 && limit >= 0.0 && unit_cost >= 0.0,
            "pricing inputs must be validated before calculation"
        );
        let kind = self.kind();

        if spend <= limit {
            return CostBreakdown::new(
                metric,
                kind,
                spend,
                limit,
                Segment::priced(spend, unit_cost),
                Segment::none(),
                None,
            );
        }

        match self {
            Self::Flat | Self::FixedFee => CostBreakdown::new(
                metric,
                kind,
                spend,
                limit,
                Segment::priced(spend, unit_cost),
                Segment::none(),
                None,
            ),
            Self::Tiered(table) => {
                let split = tiered_breakdown(spend, limit, table);
                CostBreakdown::new(metric, kind, spend, limit, split.within, split.over, None)
            }
            Self::Surcharge { multiplier } => CostBreakdown::new(
                metric,
                kind,
                spend,
                limit,
                Segment::priced(limit, unit_cost),
                Segment::priced(spend - limit, unit_cost * multiplier),
                Some(*multiplier),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn all_policies() -> Vec<ResolvedPolicy> {
        vec![
            ResolvedPolicy::Flat,
            ResolvedPolicy::Tiered(TierTable::projects()),
            ResolvedPolicy::FixedFee,
            ResolvedPolicy::Surcharge {
                multiplier: DEFAULT_SURCHARGE_MULTIPLIER,
            },
        ]
    }

    #[test]
    fn test_under_limit_is_flat_for_every_policy() {
        for policy in all_policies() {
            let breakdown = policy.price("m", 12.0, 15.0, 7.5);
            assert!(breakdown.within_limit);
            assert!(approx_eq(breakdown.total, 90.0), "{:?}", policy.kind());
            assert!(breakdown.over.is_empty());
        }
    }

    #[test]
    fn test_surcharge_over_limit() {
        let policy = ResolvedPolicy::Surcharge {
            multiplier: DEFAULT_SURCHARGE_MULTIPLIER,
        };
        let breakdown = policy.price("CS Mds", 20.0, 15.0, 5.0);

        assert!(!breakdown.within_limit);
        assert!(approx_eq(breakdown.within.cost, 75.0));
        assert_eq!(breakdown.over.quantity, 5.0);
        assert!(approx_eq(breakdown.over.rate, 6.5));
        assert!(approx_eq(breakdown.over.cost, 32.5));
        assert!(approx_eq(breakdown.total, 107.5));
        assert_eq!(breakdown.surcharge_multiplier, Some(1.3));
    }

    #[test]
    fn test_fixed_fee_ignores_limit() {
        let policy = ResolvedPolicy::FixedFee;
        assert!(approx_eq(policy.price("Premimum SLA", 5.0, 15.0, 13043.0).total, 65215.0));

        let over = policy.price("Premimum SLA", 20.0, 15.0, 13043.0);
        assert!(approx_eq(over.total, 20.0 * 13043.0));
        assert!(over.over.is_empty());
    }

    #[test]
    fn test_flat_over_limit() {
        let breakdown = ResolvedPolicy::Flat.price("storage", 120.0, 100.0, 23.0);
        assert!(approx_eq(breakdown.total, 2760.0));
        assert_eq!(breakdown.policy, PolicyKind::Flat);
    }

    #[test]
    fn test_tiered_over_limit_ignores_unit_cost() {
        let policy = ResolvedPolicy::Tiered(TierTable::projects());
        let breakdown = policy.price("Počet projektů", 150.0, 130.0, 377.0);

        assert!(approx_eq(breakdown.total, 64250.0));
        assert_eq!(breakdown.within.rate, 425.0);
        assert_eq!(breakdown.over.rate, 450.0);
    }

    #[test]
    fn test_policy_deserialization() {
        let policy: PricingPolicy = serde_yaml::from_str("kind: tiered\ntable: ppu").unwrap();
        assert_eq!(policy, PricingPolicy::tiered("ppu"));

        let policy: PricingPolicy = serde_yaml::from_str("kind: fixed_fee").unwrap();
        assert_eq!(policy.kind(), PolicyKind::FixedFee);
        assert_eq!(PricingPolicy::default(), PricingPolicy::Surcharge);
    }
}

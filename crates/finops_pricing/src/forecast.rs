//! What-if cost projections from hypothetical volumes.
//!
//! A forecast prices the whole projected volume at a single rate. There is no
//! limit split and no surcharge: the projection assumes the planned volume is
//! the new commitment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::{PolicyKind, ResolvedPolicy};
use crate::tier::resolve_rate;
use crate::usage::MetricUsage;

/// Projected cost of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLine {
    pub metric: String,
    pub policy: PolicyKind,
    /// Volume that was priced
    pub volume: f64,
    pub unit_rate: f64,
    pub cost: f64,
    /// Fixed-fee metric carried over from recorded usage
    #[serde(default)]
    pub fixed: bool,
}

impl ForecastLine {
    fn new(usage: &MetricUsage, policy: PolicyKind, volume: f64, unit_rate: f64, fixed: bool) -> Self {
        Self {
            metric: usage.metric.clone(),
            policy,
            volume,
            unit_rate,
            cost: volume * unit_rate,
            fixed,
        }
    }
}

/// Forecast for a whole usage sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub lines: Vec<ForecastLine>,
    pub total: f64,
    pub generated_at: DateTime<Utc>,
}

impl ForecastSummary {
    pub(crate) fn from_lines(lines: Vec<ForecastLine>) -> Self {
        let total = lines.iter().map(|l| l.cost).sum();
        Self {
            lines,
            total,
            generated_at: Utc::now(),
        }
    }

    pub fn line(&self, metric: &str) -> Option<&ForecastLine> {
        self.lines.iter().find(|l| l.metric == metric)
    }
}

pub(crate) fn forecast_line(policy: &ResolvedPolicy, usage: &MetricUsage, volume: f64) -> ForecastLine {
    debug_assert!(volume >= 0.0, "forecast volume must be non-negative");
    let kind = policy.kind();

    match policy {
        ResolvedPolicy::Tiered(table) => {
            ForecastLine::new(usage, kind, volume, resolve_rate(volume, table), false)
        }
        ResolvedPolicy::FixedFee => ForecastLine::new(usage, kind, usage.spend, usage.unit_cost, true),
        ResolvedPolicy::Flat | ResolvedPolicy::Surcharge { .. } => {
            ForecastLine::new(usage, kind, volume, usage.unit_cost, false)
        }
    }
}

//! Recorded usage supplied by the host.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{load_document, DeploymentMetrics, PricingConfig};
use crate::error::{PricingError, PricingResult};

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Spend, limit and unit costs of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricUsage {
    pub metric: String,
    /// Current spend (consumed quantity)
    pub spend: f64,
    /// Contracted limit
    pub limit: f64,
    /// Discounted unit cost used for pricing
    pub unit_cost: f64,
    /// Basic unit cost before the sales discount
    #[serde(default)]
    pub list_unit_cost: f64,
}

impl MetricUsage {
    /// Usage with the list price equal to the unit cost.
    pub fn new(metric: impl Into<String>, spend: f64, limit: f64, unit_cost: f64) -> Self {
        Self {
            metric: metric.into(),
            spend,
            limit,
            unit_cost,
            list_unit_cost: unit_cost,
        }
    }

    pub fn with_list_unit_cost(mut self, list_unit_cost: f64) -> Self {
        self.list_unit_cost = list_unit_cost;
        self
    }

    /// Reject negative or non-finite numbers.
    pub fn validate(&self) -> PricingResult<()> {
        if self.metric.trim().is_empty() {
            return Err(PricingError::invalid_input("", "metric name is empty"));
        }
        for (field, value) in [
            ("spend", self.spend),
            ("limit", self.limit),
            ("unit_cost", self.unit_cost),
            ("list_unit_cost", self.list_unit_cost),
        ] {
            check_amount(&self.metric, field, value)?;
        }
        Ok(())
    }

    pub fn is_over_limit(&self) -> bool {
        self.spend > self.limit
    }

    /// Whole percent of the limit consumed, `None` for a zero limit.
    pub fn utilization_percent(&self) -> Option<f64> {
        if self.limit == 0.0 {
            return None;
        }
        Some((self.spend / self.limit * 100.0).floor())
    }

    /// Utilization capped at 100 for progress display.
    pub fn progress_percent(&self) -> Option<f64> {
        self.utilization_percent().map(|p| p.min(100.0))
    }

    /// Sales discount of the unit cost against the list price.
    pub fn discount_fraction(&self) -> f64 {
        if self.list_unit_cost == 0.0 {
            return 0.0;
        }
        1.0 - self.unit_cost / self.list_unit_cost
    }
}

pub(crate) fn check_amount(metric: &str, field: &str, value: f64) -> PricingResult<()> {
    if !value.is_finite() {
        return Err(PricingError::invalid_input(
            metric,
            format!("{} must be a finite number", field),
        ));
    }
    if value < 0.0 {
        return Err(PricingError::invalid_input(
            metric,
            format!("{} must not be negative, got {}", field, value),
        ));
    }
    Ok(())
}

/// Reporting period for the usage overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Yearly,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Monthly => write!(f, "monthly"),
            Period::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" => Ok(Period::Monthly),
            "yearly" | "year" | "annual" => Ok(Period::Yearly),
            other => Err(format!("unknown period '{}' (expected monthly or yearly)", other)),
        }
    }
}

/// Usage of every metric for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSheet {
    pub metrics: Vec<MetricUsage>,
}

impl UsageSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, usage: MetricUsage) -> Self {
        self.metrics.push(usage);
        self
    }

    /// Sample usage of the default deployment.
    pub fn deployment_default() -> Self {
        Self::new()
            .with(
                MetricUsage::new(DeploymentMetrics::PROJECT_COUNT, 150.0, 130.0, 377.0)
                    .with_list_unit_cost(468.0),
            )
            .with(
                MetricUsage::new(DeploymentMetrics::PPU, 20_000.0, 28_000.0, 0.75)
                    .with_list_unit_cost(0.94),
            )
            .with(
                MetricUsage::new(DeploymentMetrics::PREMIUM_SLA, 13_043.0, 13_043.0, 0.0)
                    .with_list_unit_cost(0.0),
            )
            .with(
                MetricUsage::new(DeploymentMetrics::CS_MDS, 5.0, 15.0, 500.0)
                    .with_list_unit_cost(650.0),
            )
            .with(
                MetricUsage::new(DeploymentMetrics::SNOWFLAKE_CREDITS, 3_500.0, 4_167.0, 4.0)
                    .with_list_unit_cost(5.0),
            )
            .with(
                MetricUsage::new(DeploymentMetrics::SNOWFLAKE_STORAGE, 70.0, 100.0, 23.0)
                    .with_list_unit_cost(30.0),
            )
    }

    /// Load and validate a usage file (`.yaml`, `.yml` or `.toml`).
    pub fn from_file(path: &Path) -> PricingResult<Self> {
        let sheet: Self = load_document(path)?;
        sheet.validate()?;
        info!("Loaded usage for {} metrics from {:?}", sheet.metrics.len(), path);
        Ok(sheet)
    }

    pub fn validate(&self) -> PricingResult<()> {
        let mut seen = HashSet::new();
        for usage in &self.metrics {
            usage.validate()?;
            if !seen.insert(usage.metric.as_str()) {
                return Err(PricingError::invalid_input(
                    usage.metric.as_str(),
                    "metric listed more than once",
                ));
            }
        }
        Ok(())
    }

    pub fn get(&self, metric: &str) -> Option<&MetricUsage> {
        self.metrics.iter().find(|u| u.metric == metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricUsage> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Project the sheet onto a reporting period.
    ///
    /// The yearly view multiplies spend by twelve for metrics that scale with
    /// the period and replaces their limit with the configured annual limit
    /// (or twelve monthly limits). Unit costs are never scaled.
    pub fn view(&self, period: Period, config: &PricingConfig) -> UsageSheet {
        if period == Period::Monthly {
            return self.clone();
        }

        let metrics = self
            .metrics
            .iter()
            .map(|usage| {
                let definition = config.metric(&usage.metric);
                let scales = definition.map_or(true, |d| d.scales_with_period);
                if !scales {
                    return usage.clone();
                }
                let annual_limit = definition
                    .and_then(|d| d.annual_limit)
                    .unwrap_or(usage.limit * MONTHS_PER_YEAR);
                MetricUsage {
                    spend: usage.spend * MONTHS_PER_YEAR,
                    limit: annual_limit,
                    ..usage.clone()
                }
            })
            .collect();

        UsageSheet { metrics }
    }
}

//! Pricing engine: policy dispatch and aggregation over a usage sheet.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{deployment_config, PricingConfig};
use crate::error::{PricingError, PricingResult};
use crate::forecast::{forecast_line, ForecastLine, ForecastSummary};
use crate::policy::{CostBreakdown, PolicyKind, PricingPolicy, ResolvedPolicy};
use crate::usage::{check_amount, MetricUsage, UsageSheet};

/// Per-metric costs of one calculation and their sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    pub lines: Vec<CostBreakdown>,
    pub total: f64,
    pub generated_at: DateTime<Utc>,
}

impl CalculationResult {
    fn from_lines(lines: Vec<CostBreakdown>) -> Self {
        let total = lines.iter().map(|l| l.total).sum();
        Self {
            lines,
            total,
            generated_at: Utc::now(),
        }
    }

    pub fn line(&self, metric: &str) -> Option<&CostBreakdown> {
        self.lines.iter().find(|l| l.metric == metric)
    }

    /// Metrics whose spend exceeded the limit.
    pub fn over_limit(&self) -> impl Iterator<Item = &CostBreakdown> {
        self.lines.iter().filter(|l| !l.within_limit)
    }
}

/// Immutable pricing engine.
///
/// Policies are resolved against the tier tables once, at construction.
/// Metrics missing from the configuration are priced with the surcharge
/// policy.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    policies: HashMap<String, ResolvedPolicy>,
    fallback: ResolvedPolicy,
}

impl PricingEngine {
    pub fn new(config: &PricingConfig) -> PricingResult<Self> {
        config.validate()?;

        let mut policies = HashMap::with_capacity(config.metrics.len());
        for definition in &config.metrics {
            let resolved = match &definition.policy {
                PricingPolicy::Flat => ResolvedPolicy::Flat,
                PricingPolicy::FixedFee => ResolvedPolicy::FixedFee,
                PricingPolicy::Surcharge => ResolvedPolicy::Surcharge {
                    multiplier: config.surcharge_multiplier,
                },
                PricingPolicy::Tiered { table } => {
                    let table = config.table(table).cloned().ok_or_else(|| {
                        PricingError::UnknownTierTable {
                            metric: definition.id.clone(),
                            table: table.clone(),
                        }
                    })?;
                    ResolvedPolicy::Tiered(table)
                }
            };
            debug!(metric = %definition.id, policy = %resolved.kind(), "Resolved pricing policy");
            policies.insert(definition.id.clone(), resolved);
        }

        Ok(Self {
            policies,
            fallback: ResolvedPolicy::Surcharge {
                multiplier: config.surcharge_multiplier,
            },
        })
    }

    /// Engine over the default deployment configuration.
    pub fn deployment_default() -> PricingResult<Self> {
        Self::new(deployment_config())
    }

    fn resolve(&self, metric_id: &str) -> &ResolvedPolicy {
        self.policies.get(metric_id).unwrap_or(&self.fallback)
    }

    pub fn policy_for(&self, metric_id: &str) -> PolicyKind {
        self.resolve(metric_id).kind()
    }

    /// Price one metric.
    ///
    /// Inputs must be non-negative; validate them with
    /// [`MetricUsage::validate`] first.
    pub fn cost_for_metric(
        &self,
        metric_id: &str,
        spend: f64,
        limit: f64,
        unit_cost: f64,
    ) -> CostBreakdown {
        self.resolve(metric_id).price(metric_id, spend, limit, unit_cost)
    }

    /// Project the cost of `volume` for one metric.
    pub fn forecast(&self, usage: &MetricUsage, volume: f64) -> ForecastLine {
        forecast_line(self.resolve(&usage.metric), usage, volume)
    }

    /// Validate the sheet and price every metric in it.
    pub fn calculate(&self, sheet: &UsageSheet) -> PricingResult<CalculationResult> {
        sheet.validate()?;

        let lines: Vec<_> = sheet
            .iter()
            .map(|u| self.cost_for_metric(&u.metric, u.spend, u.limit, u.unit_cost))
            .collect();
        let result = CalculationResult::from_lines(lines);
        info!(
            "Calculated costs for {} metrics, total {:.2}",
            result.lines.len(),
            result.total
        );
        Ok(result)
    }

    /// Forecast every metric of the sheet.
    ///
    /// Metrics without an entry in `volumes` are forecast at zero volume.
    /// A volume for a metric that is not in the sheet is rejected, and so is
    /// one for a fixed-fee metric, whose forecast is its recorded fee.
    pub fn forecast_all(
        &self,
        sheet: &UsageSheet,
        volumes: &HashMap<String, f64>,
    ) -> PricingResult<ForecastSummary> {
        sheet.validate()?;
        for (metric, volume) in volumes {
            check_amount(metric, "forecast volume", *volume)?;
            if sheet.get(metric).is_none() {
                return Err(PricingError::InvalidInput {
                    metric: metric.clone(),
                    message: "no usage recorded for this metric".to_string(),
                });
            }
            if self.policy_for(metric) == PolicyKind::FixedFee {
                return Err(PricingError::invalid_input(
                    metric.as_str(),
                    "fixed-fee metrics are forecast at their recorded fee and take no volume",
                ));
            }
        }

        let lines = sheet
            .iter()
            .map(|u| {
                let volume = volumes.get(&u.metric).copied().unwrap_or(0.0);
                self.forecast(u, volume)
            })
            .collect();
        let summary = ForecastSummary::from_lines(lines);
        info!("Forecast total {:.2}", summary.total);
        Ok(summary)
    }
}

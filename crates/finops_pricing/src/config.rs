//! Declarative pricing configuration.
//!
//! Tier tables, the surcharge multiplier and the per-metric policy tags are
//! data, loaded from YAML or TOML and validated before an engine is built.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PricingError, PricingResult};
use crate::policy::{PricingPolicy, DEFAULT_SURCHARGE_MULTIPLIER};
use crate::tier::TierTable;

/// Environment variable overriding the surcharge multiplier.
pub const SURCHARGE_MULTIPLIER_ENV: &str = "FINOPS_SURCHARGE_MULTIPLIER";

/// Metric identifiers of the default deployment.
pub struct DeploymentMetrics;

impl DeploymentMetrics {
    pub const PROJECT_COUNT: &'static str = "Počet projektů";
    pub const PPU: &'static str = "PPU";
    pub const PREMIUM_SLA: &'static str = "Premimum SLA";
    pub const CS_MDS: &'static str = "CS Mds";
    pub const SNOWFLAKE_CREDITS: &'static str = "Snowflake credits";
    pub const SNOWFLAKE_STORAGE: &'static str = "Snowflake storage";

    pub const ALL: [&'static str; 6] = [
        Self::PROJECT_COUNT,
        Self::PPU,
        Self::PREMIUM_SLA,
        Self::CS_MDS,
        Self::SNOWFLAKE_CREDITS,
        Self::SNOWFLAKE_STORAGE,
    ];
}

/// Static description of a billable metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Metric identifier, matched exactly against usage input
    pub id: String,
    /// Whether the yearly view multiplies spend by twelve
    #[serde(default = "default_true")]
    pub scales_with_period: bool,
    /// Yearly limit; `limit * 12` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_limit: Option<f64>,
    /// Published over-consumption list price, shown in the price sheet only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overage_list_price: Option<f64>,
    /// Pricing policy tag
    #[serde(default)]
    pub policy: PricingPolicy,
}

fn default_true() -> bool {
    true
}

impl MetricDefinition {
    pub fn new(id: impl Into<String>, policy: PricingPolicy) -> Self {
        Self {
            id: id.into(),
            scales_with_period: true,
            annual_limit: None,
            overage_list_price: None,
            policy,
        }
    }

    /// Keep spend and limit unchanged in the yearly view.
    pub fn fixed_in_period(mut self) -> Self {
        self.scales_with_period = false;
        self
    }

    pub fn with_annual_limit(mut self, limit: f64) -> Self {
        self.annual_limit = Some(limit);
        self
    }

    pub fn with_overage_list_price(mut self, price: f64) -> Self {
        self.overage_list_price = Some(price);
        self
    }
}

/// Complete pricing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Multiplier applied to over-limit unit cost under the surcharge policy
    #[serde(default = "default_surcharge_multiplier")]
    pub surcharge_multiplier: f64,
    /// Named tier tables referenced by tiered metrics
    #[serde(default)]
    pub tier_tables: Vec<TierTable>,
    /// Known metrics; anything else is priced with the surcharge policy
    #[serde(default)]
    pub metrics: Vec<MetricDefinition>,
}

fn default_surcharge_multiplier() -> f64 {
    DEFAULT_SURCHARGE_MULTIPLIER
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            surcharge_multiplier: DEFAULT_SURCHARGE_MULTIPLIER,
            tier_tables: Vec::new(),
            metrics: Vec::new(),
        }
    }
}

static DEPLOYMENT_CONFIG: LazyLock<PricingConfig> = LazyLock::new(build_deployment_config);

/// Process-wide default deployment configuration.
pub fn deployment_config() -> &'static PricingConfig {
    &DEPLOYMENT_CONFIG
}

fn build_deployment_config() -> PricingConfig {
    PricingConfig {
        surcharge_multiplier: DEFAULT_SURCHARGE_MULTIPLIER,
        tier_tables: vec![TierTable::projects(), TierTable::ppu()],
        metrics: vec![
            MetricDefinition::new(
                DeploymentMetrics::PROJECT_COUNT,
                PricingPolicy::tiered(TierTable::PROJECTS),
            )
            .fixed_in_period()
            .with_overage_list_price(650.0),
            MetricDefinition::new(DeploymentMetrics::PPU, PricingPolicy::tiered(TierTable::PPU))
                .with_annual_limit(336_000.0)
                .with_overage_list_price(1.3),
            MetricDefinition::new(DeploymentMetrics::PREMIUM_SLA, PricingPolicy::FixedFee)
                .fixed_in_period(),
            MetricDefinition::new(DeploymentMetrics::CS_MDS, PricingPolicy::Surcharge)
                .with_annual_limit(180.0),
            MetricDefinition::new(DeploymentMetrics::SNOWFLAKE_CREDITS, PricingPolicy::Surcharge)
                .with_annual_limit(50_004.0),
            MetricDefinition::new(DeploymentMetrics::SNOWFLAKE_STORAGE, PricingPolicy::Surcharge)
                .fixed_in_period(),
        ],
    }
}

impl PricingConfig {
    /// The default deployment: six metrics, project and PPU tier tables.
    pub fn deployment_default() -> Self {
        deployment_config().clone()
    }

    /// Load and validate a configuration file (`.yaml`, `.yml` or `.toml`).
    pub fn from_file(path: &Path) -> PricingResult<Self> {
        let config: Self = load_document(path)?;
        config.validate()?;
        info!(
            "Loaded pricing configuration from {:?} ({} metrics, {} tier tables)",
            path,
            config.metrics.len(),
            config.tier_tables.len()
        );
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> PricingResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> PricingResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> PricingResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_toml_string(&self) -> PricingResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Apply overrides from process environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SURCHARGE_MULTIPLIER_ENV) {
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 1.0 => {
                    info!("Surcharge multiplier overridden to {}", value);
                    self.surcharge_multiplier = value;
                }
                _ => warn!(
                    "Ignoring {}={:?}: expected a number of at least 1.0",
                    SURCHARGE_MULTIPLIER_ENV, raw
                ),
            }
        }
        self
    }

    pub fn table(&self, name: &str) -> Option<&TierTable> {
        self.tier_tables.iter().find(|t| t.name() == name)
    }

    pub fn metric(&self, id: &str) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.id == id)
    }

    /// Check cross-references and numeric ranges.
    pub fn validate(&self) -> PricingResult<()> {
        if !self.surcharge_multiplier.is_finite() || self.surcharge_multiplier < 1.0 {
            return Err(PricingError::InvalidConfiguration(format!(
                "surcharge multiplier must be at least 1.0, got {}",
                self.surcharge_multiplier
            )));
        }

        let mut table_names = HashSet::new();
        for table in &self.tier_tables {
            table.validate()?;
            if !table_names.insert(table.name()) {
                return Err(PricingError::InvalidConfiguration(format!(
                    "duplicate tier table '{}'",
                    table.name()
                )));
            }
        }

        let mut metric_ids = HashSet::new();
        for metric in &self.metrics {
            if metric.id.trim().is_empty() {
                return Err(PricingError::InvalidConfiguration(
                    "metric id must not be empty".to_string(),
                ));
            }
            if !metric_ids.insert(metric.id.as_str()) {
                return Err(PricingError::InvalidConfiguration(format!(
                    "duplicate metric '{}'",
                    metric.id
                )));
            }
            if let PricingPolicy::Tiered { table } = &metric.policy {
                if !table_names.contains(table.as_str()) {
                    return Err(PricingError::UnknownTierTable {
                        metric: metric.id.clone(),
                        table: table.clone(),
                    });
                }
            }
            for (field, value) in [
                ("annual_limit", metric.annual_limit),
                ("overage_list_price", metric.overage_list_price),
            ] {
                if let Some(value) = value {
                    if !value.is_finite() || value < 0.0 {
                        return Err(PricingError::InvalidConfiguration(format!(
                            "metric '{}' has invalid {} {}",
                            metric.id, field, value
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Serialization formats accepted for configuration and usage files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> PricingResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

impl FromStr for DocumentFormat {
    type Err = PricingError;

    fn from_str(s: &str) -> PricingResult<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(PricingError::UnsupportedFormat(format!(
                "'{}' (expected yaml, yml or toml)",
                other
            ))),
        }
    }
}

pub(crate) fn load_document<T: DeserializeOwned>(path: &Path) -> PricingResult<T> {
    let format = DocumentFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(&content)?),
        DocumentFormat::Toml => Ok(toml::from_str(&content)?),
    }
}

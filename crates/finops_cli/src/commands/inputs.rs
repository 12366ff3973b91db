//! Pricing configuration and usage sources shared by the commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use finops_pricing::{PricingConfig, UsageSheet};

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Pricing configuration file (.yaml, .yml or .toml)
    #[arg(short, long, env = "FINOPS_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConfigSource {
    /// Load the configuration, falling back to the default deployment, and
    /// apply environment overrides.
    pub fn load(&self) -> Result<PricingConfig> {
        let config = match &self.config {
            Some(path) => PricingConfig::from_file(path).with_context(|| {
                format!("Failed to load pricing configuration from {}", path.display())
            })?,
            None => {
                info!("No pricing configuration given, using the default deployment");
                PricingConfig::deployment_default()
            }
        };

        let config = config.with_env_overrides();
        config
            .validate()
            .context("Pricing configuration is invalid after environment overrides")?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct UsageSource {
    /// Usage file (.yaml, .yml or .toml)
    #[arg(short, long, env = "FINOPS_USAGE")]
    pub usage: Option<PathBuf>,
}

impl UsageSource {
    pub fn load(&self) -> Result<UsageSheet> {
        match &self.usage {
            Some(path) => UsageSheet::from_file(path)
                .with_context(|| format!("Failed to load usage from {}", path.display())),
            None => {
                info!("No usage file given, using the default deployment sample");
                Ok(UsageSheet::deployment_default())
            }
        }
    }
}

//! Config command - Print the effective pricing configuration.

use anyhow::Result;
use clap::Args;

use finops_pricing::{DocumentFormat, PricingConfig};

use super::inputs::ConfigSource;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    config: ConfigSource,

    /// Output format (yaml or toml)
    #[arg(short, long, default_value = "yaml")]
    format: DocumentFormat,
}

pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = args.config.load()?;
    print!("{}", render(&config, args.format)?);
    Ok(())
}

fn render(config: &PricingConfig, format: DocumentFormat) -> Result<String> {
    let rendered = match format {
        DocumentFormat::Yaml => config.to_yaml_string()?,
        DocumentFormat::Toml => config.to_toml_string()?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_config_loads_back() {
        let config = PricingConfig::deployment_default();

        let yaml = render(&config, DocumentFormat::Yaml).unwrap();
        assert!(yaml.contains("surcharge_multiplier"));
        assert_eq!(PricingConfig::from_yaml_str(&yaml).unwrap(), config);

        let toml = render(&config, DocumentFormat::Toml).unwrap();
        assert!(toml.contains("[[tier_tables]]"));
        assert_eq!(PricingConfig::from_toml_str(&toml).unwrap(), config);
    }
}

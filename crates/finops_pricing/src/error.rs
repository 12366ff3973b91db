//! Error types for the pricing engine.

use thiserror::Error;

/// Result type alias for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur while loading pricing inputs or building an engine.
///
/// The calculation functions themselves are total over validated input and
/// never return these.
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Invalid input for metric '{metric}': {message}")]
    InvalidInput { metric: String, message: String },

    #[error("Malformed tier table '{table}': {reason}")]
    MalformedTierTable { table: String, reason: String },

    #[error("Metric '{metric}' references unknown tier table '{table}'")]
    UnknownTierTable { metric: String, table: String },

    #[error("Invalid pricing configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl PricingError {
    pub(crate) fn invalid_input(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            metric: metric.into(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTierTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from caller-supplied usage data rather than
    /// from pricing configuration.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

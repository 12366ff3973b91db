//! # finops_pricing
//!
//! Usage-based billing and cost forecasting for FinOps.
//!
//! This crate provides:
//! - **Tier Tables**: contiguous volume bands with discounts and unit prices
//! - **Rate Resolution**: unit price lookup with a top-tier fallback
//! - **Tiered Costs**: spend split at the contracted limit, each part priced from the table
//! - **Pricing Policies**: flat, tiered, fixed-fee and surcharge billing per metric
//! - **Forecasts**: what-if projections from hypothetical volumes
//!
//! ## Example
//!
//! ```rust,ignore
//! use finops_pricing::{PricingConfig, PricingEngine, UsageSheet};
//!
//! let engine = PricingEngine::new(&PricingConfig::deployment_default())?;
//! let result = engine.calculate(&UsageSheet::deployment_default())?;
//!
//! for line in &result.lines {
//!     println!("{}: {:.2}", line.metric, line.total);
//! }
//! println!("Total: {:.2}", result.total);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod policy;
pub mod report;
pub mod tier;
pub mod tiered;
pub mod usage;

pub use config::{deployment_config, DeploymentMetrics, DocumentFormat, MetricDefinition, PricingConfig};
pub use engine::{CalculationResult, PricingEngine};
pub use error::{PricingError, PricingResult};
pub use forecast::{ForecastLine, ForecastSummary};
pub use policy::{CostBreakdown, PolicyKind, PricingPolicy, DEFAULT_SURCHARGE_MULTIPLIER};
pub use report::{format_money, format_quantity};
pub use tier::{resolve_rate, Tier, TierTable};
pub use tiered::{tiered_breakdown, tiered_cost, Segment, TieredSplit};
pub use usage::{MetricUsage, Period, UsageSheet};

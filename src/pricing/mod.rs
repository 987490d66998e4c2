mod calc;
mod catalog;
mod edit;
mod types;

pub(crate) use calc::compute_cost;
pub(crate) use catalog::PricingCatalog;
pub(crate) use edit::PricingEdit;
pub(crate) use types::{BillingMode, PricingConfig, PricingDefaults, TokenPricing};

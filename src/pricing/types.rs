use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_INPUT_PRICE: f64 = 2.0;
pub(crate) const DEFAULT_OUTPUT_PRICE: f64 = 3.0;
pub(crate) const DEFAULT_CACHED_INPUT_PRICE: f64 = 0.2;
pub(crate) const DEFAULT_PRICE_PER_REQUEST: f64 = 0.01;

/// How a model's cost is derived from its usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BillingMode {
    /// Priced per million input/output/cached tokens (default)
    #[default]
    Token,
    /// Flat price per request
    Count,
}

impl BillingMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            BillingMode::Token => "token",
            BillingMode::Count => "count",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Some(BillingMode::Token),
            "count" => Some(BillingMode::Count),
            _ => None,
        }
    }
}

/// Token-mode prices, per million tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct TokenPricing {
    pub(crate) input_price_per_million: f64,
    pub(crate) output_price_per_million: f64,
    pub(crate) cached_input_price_per_million: f64,
}

/// Full pricing for one model. Both modes' fields are kept; `billing_mode`
/// selects the active one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct PricingConfig {
    pub(crate) billing_mode: BillingMode,
    pub(crate) token: TokenPricing,
    pub(crate) price_per_request: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingDefaults::default().to_config()
    }
}

/// Prices used when a model has no override, or when an edited field
/// does not parse
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct PricingDefaults {
    pub(crate) input_price: f64,
    pub(crate) output_price: f64,
    pub(crate) cached_input_price: f64,
    pub(crate) price_per_request: f64,
}

impl Default for PricingDefaults {
    fn default() -> Self {
        Self {
            input_price: DEFAULT_INPUT_PRICE,
            output_price: DEFAULT_OUTPUT_PRICE,
            cached_input_price: DEFAULT_CACHED_INPUT_PRICE,
            price_per_request: DEFAULT_PRICE_PER_REQUEST,
        }
    }
}

impl PricingDefaults {
    pub(crate) fn to_config(self) -> PricingConfig {
        PricingConfig {
            billing_mode: BillingMode::Token,
            token: TokenPricing {
                input_price_per_million: self.input_price,
                output_price_per_million: self.output_price,
                cached_input_price_per_million: self.cached_input_price,
            },
            price_per_request: self.price_per_request,
        }
    }

    /// Replace any negative or non-finite value with the built-in default
    pub(crate) fn sanitized(self) -> Self {
        let builtin = Self::default();
        let pick = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
        Self {
            input_price: pick(self.input_price, builtin.input_price),
            output_price: pick(self.output_price, builtin.output_price),
            cached_input_price: pick(self.cached_input_price, builtin.cached_input_price),
            price_per_request: pick(self.price_per_request, builtin.price_per_request),
        }
    }
}

use crate::core::UsageRecord;

use super::types::{BillingMode, PricingConfig};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Cost of one model's usage under its active billing mode
pub(crate) fn compute_cost(usage: &UsageRecord, pricing: &PricingConfig) -> f64 {
    match pricing.billing_mode {
        BillingMode::Token => {
            let p = &pricing.token;
            let cached = usage.cached_input_tokens.max(0);
            usage.non_cached_input() as f64 / TOKENS_PER_MILLION * p.input_price_per_million
                + usage.output_tokens.max(0) as f64 / TOKENS_PER_MILLION
                    * p.output_price_per_million
                + cached as f64 / TOKENS_PER_MILLION * p.cached_input_price_per_million
        }
        BillingMode::Count => usage.request_count.max(0) as f64 * pricing.price_per_request,
    }
}

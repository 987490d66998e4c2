use chrono::Utc;
use serde_json::json;

use crate::cli::SortOrder;
use crate::core::{CostReport, ModelCost, split_model_id};
use crate::pricing::PricingConfig;

use super::sorted_rows;

fn pricing_json(pricing: &PricingConfig) -> serde_json::Value {
    json!({
        "billing_mode": pricing.billing_mode.as_str(),
        "input_price_per_million": pricing.token.input_price_per_million,
        "output_price_per_million": pricing.token.output_price_per_million,
        "cached_input_price_per_million": pricing.token.cached_input_price_per_million,
        "price_per_request": pricing.price_per_request,
    })
}

fn model_json(row: &ModelCost) -> serde_json::Value {
    let (provider, model) = split_model_id(&row.model_id);
    json!({
        "model_id": row.model_id,
        "provider": provider,
        "model": model,
        "input_tokens": row.usage.input_tokens,
        "cached_input_tokens": row.usage.cached_input_tokens,
        "output_tokens": row.usage.output_tokens,
        "total_tokens": row.usage.total_tokens(),
        "request_count": row.usage.request_count,
        "pricing": pricing_json(&row.pricing),
        "cost": row.cost,
    })
}

pub(crate) fn output_report_json(report: &CostReport, order: SortOrder, currency: &str) -> String {
    let models: Vec<serde_json::Value> = sorted_rows(report, order).into_iter().map(model_json).collect();
    let t = &report.totals;
    let output = json!({
        "generated_at": Utc::now().to_rfc3339(),
        "currency": currency,
        "models": models,
        "totals": {
            "input_tokens": t.input_tokens,
            "cached_input_tokens": t.cached_input_tokens,
            "output_tokens": t.output_tokens,
            "total_tokens": t.total_tokens,
            "request_count": t.request_count,
            "cost": t.cost,
        },
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn output_pricing_json(model_id: &str, pricing: &PricingConfig) -> String {
    let output = json!({
        "model_id": model_id,
        "pricing": pricing_json(pricing),
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

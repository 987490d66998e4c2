//! Core data types shared by the ledger, the calculator and the renderers

use serde::{Deserialize, Serialize};

use crate::pricing::PricingConfig;

/// Accumulated usage for one model
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct UsageRecord {
    /// Total input tokens, cached ones included
    pub(crate) input_tokens: i64,
    pub(crate) cached_input_tokens: i64,
    pub(crate) output_tokens: i64,
    pub(crate) request_count: i64,
}

impl UsageRecord {
    /// Field-wise sum, or the name of the first counter that would overflow
    pub(crate) fn checked_add(&self, other: &UsageRecord) -> Result<UsageRecord, &'static str> {
        let sum = |field: &'static str, a: i64, b: i64| a.checked_add(b).ok_or(field);
        Ok(UsageRecord {
            input_tokens: sum("input_tokens", self.input_tokens, other.input_tokens)?,
            cached_input_tokens: sum(
                "cached_input_tokens",
                self.cached_input_tokens,
                other.cached_input_tokens,
            )?,
            output_tokens: sum("output_tokens", self.output_tokens, other.output_tokens)?,
            request_count: sum("request_count", self.request_count, other.request_count)?,
        })
    }

    /// Input tokens billed at the full input rate
    pub(crate) fn non_cached_input(&self) -> i64 {
        (self.input_tokens - self.cached_input_tokens).max(0)
    }

    /// Input plus output. Cached tokens are already part of input.
    pub(crate) fn total_tokens(&self) -> i64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Token delta reported by the metering side after a model call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct UsageDelta {
    #[serde(default)]
    pub(crate) input_tokens: i64,
    #[serde(default)]
    pub(crate) cached_input_tokens: i64,
    #[serde(default)]
    pub(crate) output_tokens: i64,
}

impl From<UsageDelta> for UsageRecord {
    fn from(delta: UsageDelta) -> Self {
        Self {
            input_tokens: delta.input_tokens,
            cached_input_tokens: delta.cached_input_tokens,
            output_tokens: delta.output_tokens,
            request_count: 0,
        }
    }
}

impl UsageDelta {
    pub(crate) fn new(input_tokens: i64, cached_input_tokens: i64, output_tokens: i64) -> Self {
        Self {
            input_tokens,
            cached_input_tokens,
            output_tokens,
        }
    }
}

/// Split a `PROVIDER:model` identifier on the first colon.
/// Identifiers without a colon are all provider.
pub(crate) fn split_model_id(model_id: &str) -> (&str, &str) {
    match model_id.split_once(':') {
        Some((provider, model)) => (provider, model),
        None => (model_id, ""),
    }
}

/// One row of a cost report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ModelCost {
    pub(crate) model_id: String,
    pub(crate) usage: UsageRecord,
    pub(crate) pricing: PricingConfig,
    pub(crate) cost: f64,
}

/// Sums across every model in a report
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct Totals {
    pub(crate) input_tokens: i64,
    pub(crate) cached_input_tokens: i64,
    pub(crate) output_tokens: i64,
    pub(crate) total_tokens: i64,
    pub(crate) request_count: i64,
    pub(crate) cost: f64,
}

impl Totals {
    /// Token counts saturate; a sum across models may exceed what one model holds
    pub(crate) fn add(&mut self, row: &ModelCost) {
        let u = &row.usage;
        self.input_tokens = self.input_tokens.saturating_add(u.input_tokens);
        self.cached_input_tokens = self.cached_input_tokens.saturating_add(u.cached_input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(u.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(u.total_tokens());
        self.request_count = self.request_count.saturating_add(u.request_count);
        self.cost += row.cost;
    }
}

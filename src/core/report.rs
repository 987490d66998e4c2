use std::collections::HashMap;

use serde::Serialize;

use crate::pricing::{PricingConfig, compute_cost};

use super::types::{ModelCost, Totals, UsageRecord};

/// Usage, pricing and cost for every model in a ledger snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct CostReport {
    pub(crate) models: Vec<ModelCost>,
    pub(crate) totals: Totals,
}

impl CostReport {
    /// Join a usage snapshot with pricing; rows come out sorted by model id
    pub(crate) fn build<F>(usage: &HashMap<String, UsageRecord>, mut pricing_of: F) -> Self
    where
        F: FnMut(&str) -> PricingConfig,
    {
        let mut ids: Vec<&String> = usage.keys().collect();
        ids.sort();

        let mut totals = Totals::default();
        let models = ids
            .into_iter()
            .map(|id| {
                let record = usage[id];
                let pricing = pricing_of(id);
                let row = ModelCost {
                    model_id: id.clone(),
                    usage: record,
                    pricing,
                    cost: compute_cost(&record, &pricing),
                };
                totals.add(&row);
                row
            })
            .collect();

        Self { models, totals }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::BillingMode;

    fn usage(input: i64, cached: i64, output: i64, requests: i64) -> UsageRecord {
        UsageRecord {
            input_tokens: input,
            cached_input_tokens: cached,
            output_tokens: output,
            request_count: requests,
        }
    }

    #[test]
    fn rows_sorted_by_model_id() {
        let mut map = HashMap::new();
        map.insert("zeta:m".to_string(), usage(1, 0, 1, 1));
        map.insert("alpha:m".to_string(), usage(1, 0, 1, 1));
        map.insert("mid:m".to_string(), usage(1, 0, 1, 1));
        let report = CostReport::build(&map, |_| PricingConfig::default());
        let ids: Vec<&str> = report.models.iter().map(|m| m.model_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha:m", "mid:m", "zeta:m"]);
    }

    #[test]
    fn totals_sum_mixed_billing_modes() {
        let mut map = HashMap::new();
        map.insert("a:token".to_string(), usage(1_000_000, 0, 500_000, 2));
        map.insert("b:count".to_string(), usage(0, 0, 0, 50));
        let report = CostReport::build(&map, |id| {
            if id == "b:count" {
                PricingConfig {
                    billing_mode: BillingMode::Count,
                    ..PricingConfig::default()
                }
            } else {
                PricingConfig::default()
            }
        });
        assert!((report.models[0].cost - 3.5).abs() < 1e-9);
        assert!((report.models[1].cost - 0.5).abs() < 1e-9);
        assert!((report.totals.cost - 4.0).abs() < 1e-9);
        assert_eq!(report.totals.request_count, 52);
        assert_eq!(report.totals.total_tokens, 1_500_000);
    }

    #[test]
    fn empty_usage_gives_empty_report() {
        let report = CostReport::build(&HashMap::new(), |_| PricingConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.totals.cost, 0.0);
    }
}

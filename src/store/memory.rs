use std::collections::HashMap;

use crate::core::{UsageDelta, UsageRecord};
use crate::error::StoreError;
use crate::pricing::PricingConfig;

use super::Store;

/// Store that keeps everything in process memory
#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryStore {
    usage: HashMap<String, UsageRecord>,
    pricing: HashMap<String, PricingConfig>,
}

impl MemoryStore {
    fn add(&mut self, model_id: &str, add: &UsageRecord) -> Result<(), StoreError> {
        let current = self.usage.get(model_id).copied().unwrap_or_default();
        let next = current.checked_add(add).map_err(|field| StoreError::Overflow {
            model: model_id.to_string(),
            field,
        })?;
        self.usage.insert(model_id.to_string(), next);
        Ok(())
    }
}

impl Store for MemoryStore {
    fn load_usage(&self) -> Result<HashMap<String, UsageRecord>, StoreError> {
        Ok(self.usage.clone())
    }

    fn load_pricing(&self) -> Result<HashMap<String, PricingConfig>, StoreError> {
        Ok(self.pricing.clone())
    }

    fn add_usage(&mut self, model_id: &str, delta: &UsageDelta) -> Result<(), StoreError> {
        self.add(model_id, &UsageRecord::from(*delta))
    }

    fn add_request(&mut self, model_id: &str) -> Result<(), StoreError> {
        self.add(
            model_id,
            &UsageRecord {
                request_count: 1,
                ..UsageRecord::default()
            },
        )
    }

    fn insert_pricing_if_absent(
        &mut self,
        model_ids: &[String],
        config: &PricingConfig,
    ) -> Result<(), StoreError> {
        for id in model_ids {
            self.pricing.entry(id.clone()).or_insert(*config);
        }
        Ok(())
    }

    fn save_pricing(&mut self, model_id: &str, config: &PricingConfig) -> Result<(), StoreError> {
        self.pricing.insert(model_id.to_string(), *config);
        Ok(())
    }

    fn reset_all(&mut self) -> Result<(), StoreError> {
        self.usage.clear();
        self.pricing.clear();
        Ok(())
    }
}

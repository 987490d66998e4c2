use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::types::{PricingConfig, PricingDefaults};

/// Per-model pricing with defaults for models that have none.
///
/// The map sits behind an `Arc` that writers replace wholesale, so a reader
/// holding a clone never sees a half-written entry.
#[derive(Debug, Default)]
pub(crate) struct PricingCatalog {
    defaults: PricingDefaults,
    configs: RwLock<Arc<HashMap<String, PricingConfig>>>,
}

impl PricingCatalog {
    pub(crate) fn new(defaults: PricingDefaults) -> Self {
        Self {
            defaults: defaults.sanitized(),
            configs: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    pub(crate) fn defaults(&self) -> &PricingDefaults {
        &self.defaults
    }

    fn current(&self) -> Arc<HashMap<String, PricingConfig>> {
        match self.configs.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut HashMap<String, PricingConfig>),
    {
        let mut guard = match self.configs.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = HashMap::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }

    /// Pricing for `model_id`, or the defaults if it has never been set
    pub(crate) fn get_pricing(&self, model_id: &str) -> PricingConfig {
        self.current()
            .get(model_id)
            .copied()
            .unwrap_or_else(|| self.defaults.to_config())
    }

    /// Replace the whole config for one model
    pub(crate) fn set_pricing(&self, model_id: &str, config: PricingConfig) {
        self.update(|map| {
            map.insert(model_id.to_string(), config);
        });
    }

    /// Create default entries for models not seen before.
    /// Returns the ids that were added.
    pub(crate) fn observe<'a, I>(&self, model_ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let known = self.current();
        let fresh: Vec<String> = model_ids
            .into_iter()
            .filter(|id| !known.contains_key(id.as_str()))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return fresh;
        }
        let defaults = self.defaults.to_config();
        self.update(|map| {
            for id in &fresh {
                map.entry(id.clone()).or_insert(defaults);
            }
        });
        fresh
    }

    /// Seed from persisted state, replacing whatever is held
    pub(crate) fn load(&self, configs: HashMap<String, PricingConfig>) {
        self.update(|map| *map = configs);
    }

    pub(crate) fn snapshot(&self) -> Arc<HashMap<String, PricingConfig>> {
        self.current()
    }

    pub(crate) fn reset_all(&self) {
        self.update(HashMap::clear);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::pricing::types::BillingMode;

    #[test]
    fn get_pricing_returns_defaults_when_unset() {
        let catalog = PricingCatalog::new(PricingDefaults::default());
        assert_eq!(catalog.get_pricing("x:y"), PricingConfig::default());
    }

    #[test]
    fn configured_defaults_apply_to_unset_models() {
        let catalog = PricingCatalog::new(PricingDefaults {
            input_price: 7.0,
            ..PricingDefaults::default()
        });
        assert_eq!(catalog.get_pricing("m").token.input_price_per_million, 7.0);
    }

    #[test]
    fn set_pricing_replaces_full_config() {
        let catalog = PricingCatalog::default();
        let mut cfg = PricingConfig::default();
        cfg.billing_mode = BillingMode::Count;
        cfg.price_per_request = 0.3;
        catalog.set_pricing("m", cfg);
        assert_eq!(catalog.get_pricing("m"), cfg);
    }

    #[test]
    fn observe_adds_only_new_models() {
        let catalog = PricingCatalog::default();
        let mut custom = PricingConfig::default();
        custom.price_per_request = 1.0;
        catalog.set_pricing("known", custom);

        let ids = vec!["known".to_string(), "new".to_string()];
        let added = catalog.observe(&ids);
        assert_eq!(added, vec!["new".to_string()]);
        assert_eq!(catalog.get_pricing("known").price_per_request, 1.0);
        assert!(catalog.snapshot().contains_key("new"));
    }

    #[test]
    fn snapshot_is_unaffected_by_later_writes() {
        let catalog = PricingCatalog::default();
        catalog.set_pricing("a", PricingConfig::default());
        let before = catalog.snapshot();
        catalog.reset_all();
        assert_eq!(before.len(), 1);
        assert!(catalog.snapshot().is_empty());
    }
}

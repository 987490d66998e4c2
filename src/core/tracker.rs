//! Usage tracker: ledger + pricing catalog + persistence + subscribers
//!
//! Every mutation writes through to the store first and only then touches
//! the in-memory maps, so a failed write leaves both sides unchanged.
//! Subscribers get a freshly computed `CostReport` after each mutation.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

use crate::error::AppError;
use crate::pricing::{PricingCatalog, PricingConfig, PricingDefaults, PricingEdit};
use crate::store::Store;
use crate::utils::debug_log;

use super::ledger::UsageLedger;
use super::report::CostReport;
use super::types::{UsageDelta, UsageRecord};

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub(crate) struct UsageTracker {
    store: Mutex<Box<dyn Store>>,
    ledger: UsageLedger,
    catalog: PricingCatalog,
    subscribers: Mutex<Vec<Sender<CostReport>>>,
}

impl UsageTracker {
    /// Load persisted usage and pricing from `store`
    pub(crate) fn open(store: Box<dyn Store>, defaults: PricingDefaults) -> Result<Self, AppError> {
        let ledger = UsageLedger::default();
        let catalog = PricingCatalog::new(defaults);
        ledger.load(store.load_usage()?);
        catalog.load(store.load_pricing()?);
        debug_log(&format!(
            "loaded {} usage records, {} pricing entries",
            ledger.snapshot().len(),
            catalog.snapshot().len()
        ));

        let tracker = Self {
            store: Mutex::new(store),
            ledger,
            catalog,
            subscribers: Mutex::new(Vec::new()),
        };
        {
            let mut store = lock(&tracker.store);
            tracker.observe_models(&mut **store)?;
        }
        Ok(tracker)
    }

    /// Give models that appear in the ledger a default pricing entry
    fn observe_models(&self, store: &mut dyn Store) -> Result<(), AppError> {
        let usage = self.ledger.snapshot();
        let known = self.catalog.snapshot();
        let fresh: Vec<String> = usage
            .keys()
            .filter(|id| !known.contains_key(id.as_str()))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return Ok(());
        }
        store.insert_pricing_if_absent(&fresh, &self.catalog.defaults().to_config())?;
        self.catalog.observe(&fresh);
        Ok(())
    }

    pub(crate) fn record_usage(&self, model_id: &str, delta: UsageDelta) -> Result<(), AppError> {
        let mut store = lock(&self.store);
        self.ledger.check_usage(model_id, &delta)?;
        store.add_usage(model_id, &delta)?;
        self.ledger.record_usage(model_id, delta)?;
        self.observe_models(&mut **store)?;
        self.publish();
        Ok(())
    }

    pub(crate) fn record_request(&self, model_id: &str) -> Result<(), AppError> {
        let mut store = lock(&self.store);
        self.ledger.check_request(model_id)?;
        store.add_request(model_id)?;
        self.ledger.record_request(model_id)?;
        self.observe_models(&mut **store)?;
        self.publish();
        Ok(())
    }

    pub(crate) fn usage_of(&self, model_id: &str) -> Option<UsageRecord> {
        self.ledger.get(model_id)
    }

    pub(crate) fn get_pricing(&self, model_id: &str) -> PricingConfig {
        self.catalog.get_pricing(model_id)
    }

    fn write_pricing(
        &self,
        store: &mut dyn Store,
        model_id: &str,
        config: PricingConfig,
    ) -> Result<(), AppError> {
        store.save_pricing(model_id, &config)?;
        self.catalog.set_pricing(model_id, config);
        self.publish();
        Ok(())
    }

    /// Replace a model's pricing; committed once the store write succeeds
    pub(crate) fn set_pricing(&self, model_id: &str, config: PricingConfig) -> Result<(), AppError> {
        let mut store = lock(&self.store);
        self.write_pricing(&mut **store, model_id, config)
    }

    /// Apply a free-text edit on top of the model's current pricing
    pub(crate) fn apply_edit(&self, model_id: &str, edit: &PricingEdit) -> Result<PricingConfig, AppError> {
        let mut store = lock(&self.store);
        let next = edit.apply(&self.catalog.get_pricing(model_id), self.catalog.defaults());
        self.write_pricing(&mut **store, model_id, next)?;
        Ok(next)
    }

    /// Clear all usage and pricing
    pub(crate) fn reset_all(&self) -> Result<(), AppError> {
        let mut store = lock(&self.store);
        store.reset_all()?;
        self.ledger.reset_all();
        self.catalog.reset_all();
        self.publish();
        Ok(())
    }

    pub(crate) fn report(&self) -> CostReport {
        let _store = lock(&self.store);
        self.build_report()
    }

    /// Caller holds the store lock, so usage and pricing come from the same state
    fn build_report(&self) -> CostReport {
        let usage = self.ledger.snapshot();
        let pricing = self.catalog.snapshot();
        let defaults = self.catalog.defaults().to_config();
        CostReport::build(&usage, |id| pricing.get(id).copied().unwrap_or(defaults))
    }

    /// Receive the current report now and a new one after every change
    pub(crate) fn subscribe(&self) -> Receiver<CostReport> {
        let _store = lock(&self.store);
        let (tx, rx) = mpsc::channel();
        // A receiver dropped before this send is pruned on the next publish
        let _ = tx.send(self.build_report());
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Caller holds the store lock, so reports go out in mutation order
    fn publish(&self) {
        let mut subscribers = lock(&self.subscribers);
        if subscribers.is_empty() {
            return;
        }
        let report = self.build_report();
        subscribers.retain(|tx| tx.send(report.clone()).is_ok());
    }
}

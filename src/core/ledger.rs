//! Per-model usage accumulation
//!
//! Writers build a new map and swap it in under the write lock; readers
//! clone the current `Arc`. A snapshot is therefore always a whole map from
//! before or after a write, including across `reset_all`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::LedgerError;

use super::types::{UsageDelta, UsageRecord};

pub(crate) type UsageMap = HashMap<String, UsageRecord>;

#[derive(Debug, Default)]
pub(crate) struct UsageLedger {
    records: RwLock<Arc<UsageMap>>,
}

/// Reject deltas that would break `cached_input_tokens <= input_tokens`
/// or make a counter go down.
fn validate_delta(model_id: &str, delta: &UsageDelta) -> Result<(), LedgerError> {
    if model_id.trim().is_empty() {
        return Err(LedgerError::EmptyModel);
    }
    for (field, value) in [
        ("input_tokens", delta.input_tokens),
        ("cached_input_tokens", delta.cached_input_tokens),
        ("output_tokens", delta.output_tokens),
    ] {
        if value < 0 {
            return Err(LedgerError::NegativeDelta {
                model: model_id.to_string(),
                field,
                value,
            });
        }
    }
    if delta.cached_input_tokens > delta.input_tokens {
        return Err(LedgerError::CachedExceedsInput {
            model: model_id.to_string(),
            cached: delta.cached_input_tokens,
            input: delta.input_tokens,
        });
    }
    Ok(())
}

/// `current + add`, or an overflow error naming the counter
fn accumulate(
    model_id: &str,
    current: UsageRecord,
    add: &UsageRecord,
) -> Result<UsageRecord, LedgerError> {
    current.checked_add(add).map_err(|field| LedgerError::Overflow {
        model: model_id.to_string(),
        field,
    })
}

fn one_request() -> UsageRecord {
    UsageRecord {
        request_count: 1,
        ..UsageRecord::default()
    }
}

impl UsageLedger {
    fn current(&self) -> Arc<UsageMap> {
        match self.records.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut UsageMap),
    {
        let mut guard = match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = UsageMap::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }

    /// Like `update`, but the new map is only swapped in if `f` succeeds
    fn try_update<F>(&self, f: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut UsageMap) -> Result<(), LedgerError>,
    {
        let mut guard = match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = UsageMap::clone(&guard);
        f(&mut next)?;
        *guard = Arc::new(next);
        Ok(())
    }

    fn apply(&self, model_id: &str, add: &UsageRecord) -> Result<(), LedgerError> {
        self.try_update(|map| {
            let current = map.get(model_id).copied().unwrap_or_default();
            map.insert(model_id.to_string(), accumulate(model_id, current, add)?);
            Ok(())
        })
    }

    /// Check that `record_usage` would accept `delta` without applying it
    pub(crate) fn check_usage(&self, model_id: &str, delta: &UsageDelta) -> Result<(), LedgerError> {
        validate_delta(model_id, delta)?;
        let current = self.get(model_id).unwrap_or_default();
        accumulate(model_id, current, &UsageRecord::from(*delta)).map(|_| ())
    }

    /// Check that `record_request` would succeed without applying it
    pub(crate) fn check_request(&self, model_id: &str) -> Result<(), LedgerError> {
        if model_id.trim().is_empty() {
            return Err(LedgerError::EmptyModel);
        }
        let current = self.get(model_id).unwrap_or_default();
        accumulate(model_id, current, &one_request()).map(|_| ())
    }

    /// Add a token delta, creating the model's record if needed
    pub(crate) fn record_usage(&self, model_id: &str, delta: UsageDelta) -> Result<(), LedgerError> {
        validate_delta(model_id, &delta)?;
        self.apply(model_id, &UsageRecord::from(delta))
    }

    pub(crate) fn record_request(&self, model_id: &str) -> Result<(), LedgerError> {
        if model_id.trim().is_empty() {
            return Err(LedgerError::EmptyModel);
        }
        self.apply(model_id, &one_request())
    }

    pub(crate) fn reset_all(&self) {
        self.update(HashMap::clear);
    }

    /// Seed from persisted state, replacing whatever is held
    pub(crate) fn load(&self, records: UsageMap) {
        self.update(|map| *map = records);
    }

    /// Point-in-time view of every model's usage
    pub(crate) fn snapshot(&self) -> Arc<UsageMap> {
        self.current()
    }

    pub(crate) fn get(&self, model_id: &str) -> Option<UsageRecord> {
        self.current().get(model_id).copied()
    }
}

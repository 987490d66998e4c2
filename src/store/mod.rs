//! Persistence port
//!
//! The tracker writes every change through a `Store` before updating its
//! in-memory maps, and loads both maps from it on startup.

#[cfg(test)]
mod memory;
mod sqlite;

use std::collections::HashMap;

use crate::core::{UsageDelta, UsageRecord};
use crate::error::StoreError;
use crate::pricing::PricingConfig;

#[cfg(test)]
pub(crate) use memory::MemoryStore;
pub(crate) use sqlite::SqliteStore;

pub(crate) trait Store: Send {
    fn load_usage(&self) -> Result<HashMap<String, UsageRecord>, StoreError>;

    fn load_pricing(&self) -> Result<HashMap<String, PricingConfig>, StoreError>;

    /// Add a token delta to a model's stored totals
    fn add_usage(&mut self, model_id: &str, delta: &UsageDelta) -> Result<(), StoreError>;

    fn add_request(&mut self, model_id: &str) -> Result<(), StoreError>;

    /// Insert default pricing rows for models not stored yet
    fn insert_pricing_if_absent(
        &mut self,
        model_ids: &[String],
        config: &PricingConfig,
    ) -> Result<(), StoreError>;

    fn save_pricing(&mut self, model_id: &str, config: &PricingConfig) -> Result<(), StoreError>;

    /// Remove all usage and pricing in one step
    fn reset_all(&mut self) -> Result<(), StoreError>;
}

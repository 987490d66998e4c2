//! Core module - usage ledger, cost report and the tracker that ties them
//! to persistence

mod ledger;
mod report;
mod tracker;
mod types;

pub(crate) use report::CostReport;
pub(crate) use tracker::UsageTracker;
pub(crate) use types::{ModelCost, UsageDelta, UsageRecord, split_model_id};

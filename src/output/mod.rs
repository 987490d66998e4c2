mod format;
mod json;
mod statusline;
mod table;

use crate::cli::SortOrder;
use crate::core::{CostReport, ModelCost};

pub(crate) use format::{Money, NumberFormat};
pub(crate) use json::{output_pricing_json, output_report_json};
pub(crate) use statusline::{format_statusline, format_statusline_json};
pub(crate) use table::{ReportTableOptions, print_pricing_table, print_report_table};

/// Report rows in display order. Ties fall back to model id.
fn sorted_rows(report: &CostReport, order: SortOrder) -> Vec<&ModelCost> {
    let mut rows: Vec<&ModelCost> = report.models.iter().collect();
    match order {
        SortOrder::Name => rows.sort_by(|a, b| a.model_id.cmp(&b.model_id)),
        SortOrder::Cost => rows.sort_by(|a, b| {
            format::compare_cost(b.cost, a.cost).then_with(|| a.model_id.cmp(&b.model_id))
        }),
        SortOrder::Tokens => rows.sort_by(|a, b| {
            b.usage
                .total_tokens()
                .cmp(&a.usage.total_tokens())
                .then_with(|| a.model_id.cmp(&b.model_id))
        }),
    }
    rows
}

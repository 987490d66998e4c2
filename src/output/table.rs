use comfy_table::{Cell, Color};

use crate::cli::SortOrder;
use crate::core::{CostReport, ModelCost, UsageRecord, split_model_id};
use crate::pricing::{BillingMode, PricingConfig};

use super::format::{
    Money, create_styled_table, format_compact, format_number, header_cell, right_cell,
    styled_cell,
};
use super::sorted_rows;

#[derive(Debug, Clone)]
pub(crate) struct ReportTableOptions {
    pub(crate) order: SortOrder,
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
    pub(crate) money: Money,
}

fn color(use_color: bool, c: Color) -> Option<Color> {
    use_color.then_some(c)
}

/// Short description of the active prices, e.g. "$2.00/$3.00/$0.20 per M"
pub(super) fn price_summary(pricing: &PricingConfig, money: &Money) -> String {
    match pricing.billing_mode {
        BillingMode::Token => format!(
            "{}/{}/{} per M",
            money.price(pricing.token.input_price_per_million),
            money.price(pricing.token.output_price_per_million),
            money.price(pricing.token.cached_input_price_per_million),
        ),
        BillingMode::Count => format!("{}/req", money.price(pricing.price_per_request)),
    }
}

fn print_summary(report: &CostReport, opts: &ReportTableOptions) {
    let c = opts.use_color;
    let nf = opts.money.number_format;
    let t = &report.totals;

    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Total Tokens", c),
        header_cell("Requests", c),
        header_cell("Input", c),
        header_cell("Output", c),
        header_cell("Cached", c),
        header_cell("Total Cost", c),
    ]);
    table.add_row(vec![
        right_cell(&format_number(t.total_tokens, nf), None, true),
        right_cell(&format_number(t.request_count, nf), None, false),
        right_cell(&format_number(t.input_tokens, nf), None, false),
        right_cell(&format_number(t.output_tokens, nf), None, false),
        right_cell(
            &format_number(t.cached_input_tokens, nf),
            color(c, Color::Magenta),
            false,
        ),
        right_cell(&opts.money.cost(t.cost), color(c, Color::Green), true),
    ]);
    println!("{table}");
}

fn model_row(row: &ModelCost, opts: &ReportTableOptions) -> Vec<Cell> {
    let c = opts.use_color;
    let nf = opts.money.number_format;
    let u: &UsageRecord = &row.usage;
    let mode_color = match row.pricing.billing_mode {
        BillingMode::Token => Color::Blue,
        BillingMode::Count => Color::Yellow,
    };

    if opts.compact {
        let (_, model) = split_model_id(&row.model_id);
        let name = if model.is_empty() { row.model_id.as_str() } else { model };
        return vec![
            styled_cell(name, None, false),
            right_cell(&format_number(u.request_count, nf), None, false),
            right_cell(&format_compact(u.total_tokens(), nf), None, false),
            right_cell(&opts.money.cost(row.cost), color(c, Color::Green), false),
        ];
    }

    let (provider, _) = split_model_id(&row.model_id);
    vec![
        styled_cell(&row.model_id, None, false),
        styled_cell(provider, None, false),
        styled_cell(row.pricing.billing_mode.as_str(), color(c, mode_color), false),
        right_cell(&format_number(u.request_count, nf), None, false),
        right_cell(&format_number(u.input_tokens, nf), None, false),
        right_cell(
            &format_number(u.cached_input_tokens, nf),
            color(c, Color::Magenta),
            false,
        ),
        right_cell(&format_number(u.output_tokens, nf), None, false),
        styled_cell(&price_summary(&row.pricing, &opts.money), None, false),
        right_cell(&opts.money.cost(row.cost), color(c, Color::Green), false),
    ]
}

pub(crate) fn print_report_table(report: &CostReport, opts: &ReportTableOptions) {
    let c = opts.use_color;
    let nf = opts.money.number_format;

    if !opts.compact {
        println!("\n  Token Usage Summary\n");
        print_summary(report, opts);
    }

    let mut table = create_styled_table();
    if opts.compact {
        table.set_header(vec![
            header_cell("Model", c),
            header_cell("Calls", c),
            header_cell("Tokens", c),
            header_cell("Cost", c),
        ]);
    } else {
        table.set_header(vec![
            header_cell("Model", c),
            header_cell("Provider", c),
            header_cell("Mode", c),
            header_cell("Calls", c),
            header_cell("Input", c),
            header_cell("Cached", c),
            header_cell("Output", c),
            header_cell("Price", c),
            header_cell("Cost", c),
        ]);
    }

    for row in sorted_rows(report, opts.order) {
        table.add_row(model_row(row, opts));
    }

    let t = &report.totals;
    let total_color = color(c, Color::Yellow);
    if opts.compact {
        table.add_row(vec![
            styled_cell("Total", total_color, true),
            right_cell(&format_number(t.request_count, nf), total_color, true),
            right_cell(&format_compact(t.total_tokens, nf), total_color, true),
            right_cell(&opts.money.cost(t.cost), color(c, Color::Green), true),
        ]);
    } else {
        table.add_row(vec![
            styled_cell("Total", total_color, true),
            styled_cell("", None, false),
            styled_cell("", None, false),
            right_cell(&format_number(t.request_count, nf), total_color, true),
            right_cell(&format_number(t.input_tokens, nf), total_color, true),
            right_cell(&format_number(t.cached_input_tokens, nf), total_color, true),
            right_cell(&format_number(t.output_tokens, nf), total_color, true),
            styled_cell("", None, false),
            right_cell(&opts.money.cost(t.cost), color(c, Color::Green), true),
        ]);
    }

    if !opts.compact {
        println!("\n  Models\n");
    }
    println!("{table}");
}

/// Both modes' prices for one model, marking the active one
pub(crate) fn print_pricing_table(model_id: &str, pricing: &PricingConfig, money: &Money, use_color: bool) {
    let c = use_color;
    let active = |mode: BillingMode| {
        if pricing.billing_mode == mode {
            color(c, Color::Green)
        } else {
            None
        }
    };
    let mark = |mode: BillingMode| if pricing.billing_mode == mode { " *" } else { "" };

    let mut table = create_styled_table();
    table.set_header(vec![header_cell("Field", c), header_cell("Value", c)]);
    table.add_row(vec![
        styled_cell("Billing mode", None, true),
        styled_cell(pricing.billing_mode.as_str(), None, true),
    ]);
    for (label, value) in [
        ("Input / M", pricing.token.input_price_per_million),
        ("Output / M", pricing.token.output_price_per_million),
        ("Cached input / M", pricing.token.cached_input_price_per_million),
    ] {
        table.add_row(vec![
            styled_cell(&format!("{label}{}", mark(BillingMode::Token)), None, false),
            right_cell(&money.price(value), active(BillingMode::Token), false),
        ]);
    }
    table.add_row(vec![
        styled_cell(&format!("Per request{}", mark(BillingMode::Count)), None, false),
        right_cell(&money.price(pricing.price_per_request), active(BillingMode::Count), false),
    ]);

    println!("\n  Pricing for {model_id}\n");
    println!("{table}");
}

use std::fs::File;
use std::io::{self, BufReader};

use crate::cli::{Cli, Commands, PriceCommands};
use crate::core::{UsageDelta, UsageTracker};
use crate::error::AppError;
use crate::feed::ingest;
use crate::output::{
    Money, ReportTableOptions, format_statusline, format_statusline_json, output_pricing_json,
    output_report_json, print_pricing_table, print_report_table,
};
use crate::pricing::PricingEdit;
use crate::utils::info;

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) tracker: &'a UsageTracker,
    pub(crate) money: Money,
}

fn handle_report(ctx: &CommandContext<'_>) {
    let report = ctx.tracker.report();
    if ctx.cli.json {
        println!("{}", output_report_json(&report, ctx.cli.order, &ctx.money.currency));
        return;
    }
    if report.is_empty() {
        println!("No usage recorded yet.");
        return;
    }
    print_report_table(
        &report,
        &ReportTableOptions {
            order: ctx.cli.order,
            use_color: ctx.cli.use_color(),
            compact: ctx.cli.compact,
            money: ctx.money.clone(),
        },
    );
}

fn handle_statusline(ctx: &CommandContext<'_>) {
    let report = ctx.tracker.report();
    if ctx.cli.json {
        println!("{}", format_statusline_json(&report, &ctx.money));
    } else {
        println!("{}", format_statusline(&report, &ctx.money));
    }
}

fn handle_ingest(path: &str, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let updates = ctx.tracker.subscribe();
    let summary = if path == "-" {
        ingest(io::stdin().lock(), "stdin", ctx.tracker)?
    } else {
        let file = File::open(path).map_err(|source| AppError::Feed {
            path: path.to_string(),
            source,
        })?;
        ingest(BufReader::new(file), path, ctx.tracker)?
    };
    info(&format!(
        "Ingested {} usage and {} request events ({} skipped)",
        summary.usage_events, summary.request_events, summary.skipped
    ));

    // The last update reflects every accepted event
    let latest = updates.try_iter().last().unwrap_or_else(|| ctx.tracker.report());
    if ctx.cli.json {
        println!("{}", output_report_json(&latest, ctx.cli.order, &ctx.money.currency));
    } else {
        println!("{}", format_statusline(&latest, &ctx.money));
    }
    Ok(())
}

fn handle_price(command: &PriceCommands, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let (model, pricing) = match command {
        PriceCommands::Show { model } => (model, ctx.tracker.get_pricing(model)),
        PriceCommands::Set {
            model,
            mode,
            input,
            output,
            cached,
            per_request,
        } => {
            let edit = PricingEdit {
                billing_mode: *mode,
                input_price: input.clone(),
                output_price: output.clone(),
                cached_input_price: cached.clone(),
                price_per_request: per_request.clone(),
            };
            (model, ctx.tracker.apply_edit(model, &edit)?)
        }
    };

    if ctx.cli.json {
        println!("{}", output_pricing_json(model, &pricing));
    } else {
        print_pricing_table(model, &pricing, &ctx.money, ctx.cli.use_color());
        if let Some(usage) = ctx.tracker.usage_of(model) {
            let cost = crate::pricing::compute_cost(&usage, &pricing);
            println!("\n  Current cost: {}\n", ctx.money.cost(cost));
        }
    }
    Ok(())
}

/// Dispatch one command against an opened tracker
pub(crate) fn handle_command(command: &Commands, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    match command {
        Commands::Report => handle_report(ctx),
        Commands::Statusline => handle_statusline(ctx),
        Commands::Record {
            model,
            input,
            cached,
            output,
            request,
        } => {
            ctx.tracker
                .record_usage(model, UsageDelta::new(*input, *cached, *output))?;
            if *request {
                ctx.tracker.record_request(model)?;
            }
            info(&format!("Recorded usage for {model}"));
        }
        Commands::Request { model, count } => {
            for _ in 0..*count {
                ctx.tracker.record_request(model)?;
            }
            info(&format!("Recorded {count} request(s) for {model}"));
        }
        Commands::Ingest { path } => handle_ingest(path, ctx)?,
        Commands::Price { command } => handle_price(command, ctx)?,
        Commands::Reset { yes } => {
            if !*yes {
                return Err(AppError::ResetNotConfirmed);
            }
            ctx.tracker.reset_all()?;
            info("All usage counters and pricing have been reset.");
        }
    }
    Ok(())
}

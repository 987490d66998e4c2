use serde_json::json;

use crate::core::CostReport;

use super::format::{Money, format_compact};

/// Output a single line suitable for statusline/tmux integration
/// Format: "$X.XX | In: XM Out: XK | Req: N"
pub(crate) fn format_statusline(report: &CostReport, money: &Money) -> String {
    let t = &report.totals;
    let nf = money.number_format;
    let mut parts = vec![
        money.cost(t.cost),
        format!(
            "In: {} Out: {}",
            format_compact(t.input_tokens, nf),
            format_compact(t.output_tokens, nf)
        ),
    ];
    if t.cached_input_tokens > 0 {
        parts.push(format!("Cached: {}", format_compact(t.cached_input_tokens, nf)));
    }
    parts.push(format!("Req: {}", t.request_count));
    parts.join(" | ")
}

/// Statusline totals as JSON for programmatic consumption
pub(crate) fn format_statusline_json(report: &CostReport, money: &Money) -> String {
    let t = &report.totals;
    let output = json!({
        "models": report.models.len(),
        "input_tokens": t.input_tokens,
        "cached_input_tokens": t.cached_input_tokens,
        "output_tokens": t.output_tokens,
        "total_tokens": t.total_tokens,
        "request_count": t.request_count,
        "cost": t.cost,
        "formatted": format_statusline(report, money),
    });
    serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UsageRecord;
    use crate::pricing::PricingConfig;
    use std::collections::HashMap;

    fn report(cached: i64) -> CostReport {
        let mut usage = HashMap::new();
        usage.insert(
            "m".to_string(),
            UsageRecord {
                input_tokens: 1_000_000,
                cached_input_tokens: cached,
                output_tokens: 500_000,
                request_count: 3,
            },
        );
        CostReport::build(&usage, |_| PricingConfig::default())
    }

    #[test]
    fn statusline_without_cache() {
        assert_eq!(
            format_statusline(&report(0), &Money::default()),
            "$3.50 | In: 1.0M Out: 500.0K | Req: 3"
        );
    }

    #[test]
    fn statusline_shows_cached_when_present() {
        let line = format_statusline(&report(200_000), &Money::default());
        assert!(line.contains("Cached: 200.0K"));
    }

    #[test]
    fn statusline_json_fields() {
        let v: serde_json::Value =
            serde_json::from_str(&format_statusline_json(&report(0), &Money::default())).unwrap();
        assert_eq!(v["models"], 1);
        assert_eq!(v["request_count"], 3);
        assert!((v["cost"].as_f64().unwrap() - 3.5).abs() < 1e-9);
    }
}

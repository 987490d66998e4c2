//! JSON-lines metering feed
//!
//! One event per line:
//! `{"type":"usage","model":"OPENAI:gpt-4o","input_tokens":120,"cached_input_tokens":20,"output_tokens":40}`
//! or `{"type":"request","model":"OPENAI:gpt-4o"}`. Blank lines are ignored.

use std::io::BufRead;

use serde::Deserialize;

use crate::core::{UsageDelta, UsageTracker};
use crate::error::AppError;
use crate::utils::{debug_log, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum FeedEvent {
    Usage {
        model: String,
        #[serde(flatten)]
        delta: UsageDelta,
    },
    Request {
        model: String,
    },
}

/// Outcome of an ingest run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IngestSummary {
    pub(crate) usage_events: u64,
    pub(crate) request_events: u64,
    pub(crate) skipped: u64,
}

pub(crate) fn parse_line(line: &str) -> Result<FeedEvent, serde_json::Error> {
    serde_json::from_str(line)
}

/// Apply every event in `reader` to the tracker.
///
/// Lines that don't parse, or that the ledger rejects, are skipped with a
/// warning. Store failures abort the run.
pub(crate) fn ingest<R: BufRead>(
    reader: R,
    source: &str,
    tracker: &UsageTracker,
) -> Result<IngestSummary, AppError> {
    let mut summary = IngestSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source_err| AppError::Feed {
            path: source.to_string(),
            source: source_err,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lineno = idx + 1;

        let event = match parse_line(trimmed) {
            Ok(event) => event,
            Err(e) => {
                warn(&format!("{source}:{lineno}: skipping malformed event: {e}"));
                summary.skipped += 1;
                continue;
            }
        };

        let applied = match &event {
            FeedEvent::Usage { model, delta } => tracker.record_usage(model, *delta),
            FeedEvent::Request { model } => tracker.record_request(model),
        };
        match applied {
            Ok(()) => match event {
                FeedEvent::Usage { .. } => summary.usage_events += 1,
                FeedEvent::Request { .. } => summary.request_events += 1,
            },
            Err(AppError::Ledger(e)) => {
                warn(&format!("{source}:{lineno}: rejected: {e}"));
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug_log(&format!(
        "ingested {} usage, {} request events from {source} ({} skipped)",
        summary.usage_events, summary.request_events, summary.skipped
    ));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingDefaults;
    use crate::store::MemoryStore;

    fn tracker() -> UsageTracker {
        UsageTracker::open(Box::new(MemoryStore::default()), PricingDefaults::default()).unwrap()
    }

    #[test]
    fn parse_usage_event() {
        let e = parse_line(
            r#"{"type":"usage","model":"A:b","input_tokens":10,"cached_input_tokens":2,"output_tokens":3}"#,
        )
        .unwrap();
        assert_eq!(
            e,
            FeedEvent::Usage {
                model: "A:b".into(),
                delta: UsageDelta::new(10, 2, 3),
            }
        );
    }

    #[test]
    fn parse_usage_event_missing_counts_default_to_zero() {
        let e = parse_line(r#"{"type":"usage","model":"A:b","output_tokens":3}"#).unwrap();
        assert_eq!(
            e,
            FeedEvent::Usage {
                model: "A:b".into(),
                delta: UsageDelta::new(0, 0, 3),
            }
        );
    }

    #[test]
    fn parse_request_event() {
        let e = parse_line(r#"{"type":"request","model":"A:b"}"#).unwrap();
        assert_eq!(e, FeedEvent::Request { model: "A:b".into() });
    }

    #[test]
    fn parse_unknown_type_fails() {
        assert!(parse_line(r#"{"type":"refund","model":"A:b"}"#).is_err());
    }

    #[test]
    fn ingest_applies_valid_and_skips_bad_lines() {
        let t = tracker();
        let feed = r#"{"type":"usage","model":"m","input_tokens":1000000,"output_tokens":500000}
not json

{"type":"request","model":"m"}
{"type":"usage","model":"m","input_tokens":-1}
{"type":"usage","model":"m","input_tokens":1,"cached_input_tokens":2}
{"type":"request","model":"m"}
"#;
        let summary = ingest(feed.as_bytes(), "test", &t).unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                usage_events: 1,
                request_events: 2,
                skipped: 3,
            }
        );
        let report = t.report();
        assert_eq!(report.models[0].usage.request_count, 2);
        assert!((report.totals.cost - 3.5).abs() < 1e-9);
    }

    #[test]
    fn ingest_skips_events_that_would_overflow() {
        let t = tracker();
        let feed = format!(
            "{{\"type\":\"usage\",\"model\":\"m\",\"output_tokens\":{max}}}\n\
             {{\"type\":\"usage\",\"model\":\"m\",\"output_tokens\":{max}}}\n\
             {{\"type\":\"usage\",\"model\":\"m\",\"input_tokens\":5}}\n",
            max = i64::MAX
        );
        let summary = ingest(feed.as_bytes(), "test", &t).unwrap();
        assert_eq!(summary.usage_events, 2);
        assert_eq!(summary.skipped, 1);
        let usage = t.usage_of("m").unwrap();
        assert_eq!(usage.output_tokens, i64::MAX);
        assert_eq!(usage.input_tokens, 5);
    }
}

//! Free-text pricing edits
//!
//! An edit carries the selected billing mode and the raw text of that mode's
//! fields. Fields that fail to parse fall back to the configured default
//! instead of rejecting the whole edit. The other mode's fields are left as
//! they were so switching back restores them.

use super::types::{BillingMode, PricingConfig, PricingDefaults};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PricingEdit {
    pub(crate) billing_mode: BillingMode,
    pub(crate) input_price: Option<String>,
    pub(crate) output_price: Option<String>,
    pub(crate) cached_input_price: Option<String>,
    pub(crate) price_per_request: Option<String>,
}

/// Parse a non-negative finite decimal, or return `fallback`
pub(crate) fn parse_price(text: &str, fallback: f64) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => fallback,
    }
}

impl PricingEdit {
    /// Build the full replacement config for a model.
    ///
    /// A field left out of the edit keeps its current value; a field that
    /// is present but malformed takes the default.
    pub(crate) fn apply(&self, current: &PricingConfig, defaults: &PricingDefaults) -> PricingConfig {
        let field = |text: &Option<String>, current: f64, default: f64| match text {
            Some(t) => parse_price(t, default),
            None => current,
        };

        let mut next = *current;
        next.billing_mode = self.billing_mode;
        match self.billing_mode {
            BillingMode::Token => {
                next.token.input_price_per_million = field(
                    &self.input_price,
                    current.token.input_price_per_million,
                    defaults.input_price,
                );
                next.token.output_price_per_million = field(
                    &self.output_price,
                    current.token.output_price_per_million,
                    defaults.output_price,
                );
                next.token.cached_input_price_per_million = field(
                    &self.cached_input_price,
                    current.token.cached_input_price_per_million,
                    defaults.cached_input_price,
                );
            }
            BillingMode::Count => {
                next.price_per_request = field(
                    &self.price_per_request,
                    current.price_per_request,
                    defaults.price_per_request,
                );
            }
        }
        next
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn defaults() -> PricingDefaults {
        PricingDefaults::default()
    }

    #[test]
    fn parse_price_accepts_decimals() {
        assert_eq!(parse_price("1.5", 9.0), 1.5);
        assert_eq!(parse_price("  0 ", 9.0), 0.0);
        assert_eq!(parse_price("3", 9.0), 3.0);
    }

    #[test]
    fn parse_price_falls_back_on_garbage() {
        assert_eq!(parse_price("", 2.0), 2.0);
        assert_eq!(parse_price("abc", 2.0), 2.0);
        assert_eq!(parse_price("-1", 2.0), 2.0);
        assert_eq!(parse_price("NaN", 2.0), 2.0);
        assert_eq!(parse_price("inf", 2.0), 2.0);
    }

    #[test]
    fn token_edit_sets_token_fields_only() {
        let current = PricingConfig {
            price_per_request: 0.5,
            ..PricingConfig::default()
        };
        let edit = PricingEdit {
            billing_mode: BillingMode::Token,
            input_price: Some("10".into()),
            output_price: Some("30".into()),
            cached_input_price: Some("1".into()),
            price_per_request: Some("99".into()),
        };
        let next = edit.apply(&current, &defaults());
        assert_eq!(next.token.input_price_per_million, 10.0);
        assert_eq!(next.token.output_price_per_million, 30.0);
        assert_eq!(next.token.cached_input_price_per_million, 1.0);
        assert_eq!(next.price_per_request, 0.5);
    }

    #[test]
    fn malformed_field_takes_default_without_aborting_edit() {
        let edit = PricingEdit {
            billing_mode: BillingMode::Token,
            input_price: Some("oops".into()),
            output_price: Some("12".into()),
            ..PricingEdit::default()
        };
        let current = PricingConfig::default();
        let next = edit.apply(&current, &defaults());
        assert_eq!(next.token.input_price_per_million, 2.0);
        assert_eq!(next.token.output_price_per_million, 12.0);
        assert_eq!(next.token.cached_input_price_per_million, 0.2);
    }

    #[test]
    fn mode_switch_round_trip_keeps_token_fields() {
        let start = PricingEdit {
            billing_mode: BillingMode::Token,
            input_price: Some("4".into()),
            output_price: Some("8".into()),
            cached_input_price: Some("0.4".into()),
            ..PricingEdit::default()
        }
        .apply(&PricingConfig::default(), &defaults());

        let counted = PricingEdit {
            billing_mode: BillingMode::Count,
            price_per_request: Some("0.05".into()),
            ..PricingEdit::default()
        }
        .apply(&start, &defaults());
        assert_eq!(counted.billing_mode, BillingMode::Count);
        assert_eq!(counted.price_per_request, 0.05);

        let back = PricingEdit {
            billing_mode: BillingMode::Token,
            ..PricingEdit::default()
        }
        .apply(&counted, &defaults());
        assert_eq!(back.token, start.token);
        assert_eq!(back.price_per_request, 0.05);
    }
}

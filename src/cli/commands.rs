//! CLI subcommand definitions

use clap::Subcommand;

use crate::pricing::BillingMode;

/// Main CLI commands
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Show per-model usage and cost (default)
    Report,
    /// Output single line for statusline/tmux integration
    Statusline,
    /// Add a token delta for a model
    Record {
        /// Model identifier, e.g. "OPENAI:gpt-4o"
        model: String,
        /// Input tokens, cached ones included
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        input: i64,
        /// Cached input tokens (must not exceed --input)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        cached: i64,
        /// Output tokens
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        output: i64,
        /// Also count one request for the model
        #[arg(long)]
        request: bool,
    },
    /// Count completed requests for a model
    Request {
        model: String,
        /// Number of requests to add
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// Read usage and request events from a JSON-lines feed ("-" for stdin)
    Ingest {
        #[arg(default_value = "-")]
        path: String,
    },
    /// Show or edit per-model pricing
    Price {
        #[command(subcommand)]
        command: PriceCommands,
    },
    /// Delete all usage counters and pricing
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum PriceCommands {
    /// Show a model's pricing (defaults if never set)
    Show { model: String },
    /// Set a model's billing mode and the prices of that mode
    Set {
        model: String,
        /// Billing mode to activate
        #[arg(long, value_enum, default_value = "token")]
        mode: BillingMode,
        /// Input price per million tokens (token mode)
        #[arg(long, value_name = "PRICE", allow_hyphen_values = true)]
        input: Option<String>,
        /// Output price per million tokens (token mode)
        #[arg(long, value_name = "PRICE", allow_hyphen_values = true)]
        output: Option<String>,
        /// Cached input price per million tokens (token mode)
        #[arg(long, value_name = "PRICE", allow_hyphen_values = true)]
        cached: Option<String>,
        /// Price per request (count mode)
        #[arg(long, value_name = "PRICE", allow_hyphen_values = true)]
        per_request: Option<String>,
    },
}

impl Commands {
    /// Commands whose stdout is meant for machines
    pub(crate) fn is_statusline(&self) -> bool {
        matches!(self, Commands::Statusline)
    }
}

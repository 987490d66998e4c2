//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigColorMode, ConfigSortOrder};

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum SortOrder {
    /// By model identifier (default)
    #[default]
    Name,
    /// Most expensive first
    Cost,
    /// Most tokens first
    Tokens,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "tokbill")]
#[command(about = "Per-model token usage and cost tracking", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// SQLite database path (default: <data dir>/tokbill/usage.db)
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) db: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Row order for reports
    #[arg(short, long, global = true, value_enum, default_value = "name")]
    pub(crate) order: SortOrder,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub(crate) debug: bool,

    /// Compact output (fewer columns)
    #[arg(short = 'c', long, global = true)]
    pub(crate) compact: bool,

    /// Locale for number formatting (e.g., "en", "zh", "de")
    #[arg(long, global = true, value_name = "LOCALE")]
    pub(crate) locale: Option<String>,

    /// Currency symbol printed before costs
    #[arg(long, global = true, value_name = "SYMBOL")]
    pub(crate) currency: Option<String>,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // Boolean flags: config only applies if CLI left them off
        if !self.compact && config.compact {
            self.compact = true;
        }
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        // Enum values: config applies only while CLI is at its default
        if let Some(order) = config.order
            && self.order == SortOrder::Name
        {
            self.order = match order {
                ConfigSortOrder::Name => SortOrder::Name,
                ConfigSortOrder::Cost => SortOrder::Cost,
                ConfigSortOrder::Tokens => SortOrder::Tokens,
            };
        }
        if let Some(color) = config.color
            && self.color == ColorMode::Auto
        {
            self.color = match color {
                ConfigColorMode::Auto => ColorMode::Auto,
                ConfigColorMode::Always => ColorMode::Always,
                ConfigColorMode::Never => ColorMode::Never,
            };
        }

        if self.db.is_none() {
            self.db = config.db.clone();
        }
        if self.locale.is_none() {
            self.locale = config.locale.clone();
        }
        if self.currency.is_none() {
            self.currency = config.currency.clone();
        }

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    pub(crate) fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or("$")
    }
}

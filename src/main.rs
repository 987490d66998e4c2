mod app;
mod cli;
mod config;
mod core;
mod error;
mod feed;
mod output;
mod pricing;
mod store;
mod utils;

use clap::Parser;

use app::{CommandContext, handle_command};
use cli::{Cli, Commands};
use config::Config;
use crate::core::UsageTracker;
use error::AppError;
use output::{Money, NumberFormat};
use store::SqliteStore;
use utils::{debug_log, set_debug, set_quiet};

fn run(cli: Cli, config: &Config) -> Result<(), AppError> {
    let number_format = NumberFormat::from_locale(cli.locale.as_deref())?;
    let money = Money::new(number_format, cli.currency());

    let store = match &cli.db {
        Some(path) => {
            debug_log(&format!("using database {}", path.display()));
            SqliteStore::open(path)?
        }
        None => {
            let (store, path) = SqliteStore::open_default()?;
            debug_log(&format!("using database {}", path.display()));
            store
        }
    };
    let tracker = UsageTracker::open(Box::new(store), config.defaults)?;

    let default_command = Commands::Report;
    let command = cli.command.as_ref().unwrap_or(&default_command);
    let ctx = CommandContext {
        cli: &cli,
        tracker: &tracker,
        money,
    };
    handle_command(command, &ctx)
}

fn main() {
    let cli = Cli::parse();
    set_debug(cli.debug);

    let config = Config::load();
    let cli = cli.with_config(&config);
    set_debug(cli.debug);
    set_quiet(cli.json || cli.command.as_ref().is_some_and(Commands::is_statusline));

    if let Err(e) = run(cli, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Unsupported locale: {input}")]
    UnsupportedLocale { input: String },

    #[error("Refusing to reset without --yes (this deletes all usage and pricing)")]
    ResetNotConfirmed,

    #[error("Failed to read feed {path}: {source}")]
    Feed {
        path: String,
        source: std::io::Error,
    },

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Rejected usage delta
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LedgerError {
    #[error("Negative {field} ({value}) for model {model}")]
    NegativeDelta {
        model: String,
        field: &'static str,
        value: i64,
    },

    #[error("Cached input tokens ({cached}) exceed input tokens ({input}) for model {model}")]
    CachedExceedsInput {
        model: String,
        cached: i64,
        input: i64,
    },

    #[error("Adding to {field} would overflow for model {model}")]
    Overflow {
        model: String,
        field: &'static str,
    },

    #[error("Empty model identifier")]
    EmptyModel,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("Stored {field} would overflow for model {model}")]
    Overflow {
        model: String,
        field: &'static str,
    },

    #[error("No data directory available; pass --db")]
    NoDataDir,
}

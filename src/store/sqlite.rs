use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::core::{UsageDelta, UsageRecord};
use crate::error::StoreError;
use crate::pricing::{BillingMode, PricingConfig, TokenPricing};

use super::Store;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS usage (
    model               TEXT PRIMARY KEY,
    input_tokens        INTEGER NOT NULL DEFAULT 0,
    cached_input_tokens INTEGER NOT NULL DEFAULT 0,
    output_tokens       INTEGER NOT NULL DEFAULT 0,
    request_count       INTEGER NOT NULL DEFAULT 0,
    updated_at          TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS pricing (
    model                 TEXT PRIMARY KEY,
    billing_mode          TEXT NOT NULL,
    input_price           REAL NOT NULL,
    output_price          REAL NOT NULL,
    cached_input_price    REAL NOT NULL,
    price_per_request     REAL NOT NULL,
    updated_at            TEXT NOT NULL
);
";

/// Default database location: `<data dir>/tokbill/usage.db`
pub(crate) fn default_db_path() -> Option<PathBuf> {
    let data = dirs::data_dir()?;
    Some(data.join("tokbill").join("usage.db"))
}

#[derive(Debug)]
pub(crate) struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub(crate) fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub(crate) fn open_default() -> Result<(Self, PathBuf), StoreError> {
        let path = default_db_path().ok_or(StoreError::NoDataDir)?;
        Ok((Self::open(&path)?, path))
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    /// Read-modify-write in one transaction. SQLite would silently turn an
    /// overflowing INTEGER sum into REAL, so the sum is checked here.
    fn add(&mut self, model_id: &str, add: &UsageRecord) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let current = tx
            .query_row(
                "SELECT input_tokens, cached_input_tokens, output_tokens, request_count
                 FROM usage WHERE model = ?1",
                params![model_id],
                |row| {
                    Ok(UsageRecord {
                        input_tokens: row.get(0)?,
                        cached_input_tokens: row.get(1)?,
                        output_tokens: row.get(2)?,
                        request_count: row.get(3)?,
                    })
                },
            )
            .optional()?
            .unwrap_or_default();
        let next = current.checked_add(add).map_err(|field| StoreError::Overflow {
            model: model_id.to_string(),
            field,
        })?;
        tx.execute(
            "INSERT OR REPLACE INTO usage
             (model, input_tokens, cached_input_tokens, output_tokens, request_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                model_id,
                next.input_tokens,
                next.cached_input_tokens,
                next.output_tokens,
                next.request_count,
                Self::now()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn load_usage(&self) -> Result<HashMap<String, UsageRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT model, input_tokens, cached_input_tokens, output_tokens, request_count FROM usage",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                UsageRecord {
                    input_tokens: row.get(1)?,
                    cached_input_tokens: row.get(2)?,
                    output_tokens: row.get(3)?,
                    request_count: row.get(4)?,
                },
            ))
        })?;
        let mut usage = HashMap::new();
        for row in rows {
            let (model, record) = row?;
            usage.insert(model, record);
        }
        Ok(usage)
    }

    fn load_pricing(&self) -> Result<HashMap<String, PricingConfig>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT model, billing_mode, input_price, output_price, cached_input_price, price_per_request FROM pricing",
        )?;
        let rows = stmt.query_map([], |row| {
            let mode: String = row.get(1)?;
            Ok((
                row.get::<_, String>(0)?,
                PricingConfig {
                    billing_mode: BillingMode::parse(&mode).unwrap_or_default(),
                    token: TokenPricing {
                        input_price_per_million: row.get(2)?,
                        output_price_per_million: row.get(3)?,
                        cached_input_price_per_million: row.get(4)?,
                    },
                    price_per_request: row.get(5)?,
                },
            ))
        })?;
        let mut pricing = HashMap::new();
        for row in rows {
            let (model, config) = row?;
            pricing.insert(model, config);
        }
        Ok(pricing)
    }

    fn add_usage(&mut self, model_id: &str, delta: &UsageDelta) -> Result<(), StoreError> {
        self.add(model_id, &UsageRecord::from(*delta))
    }

    fn add_request(&mut self, model_id: &str) -> Result<(), StoreError> {
        self.add(
            model_id,
            &UsageRecord {
                request_count: 1,
                ..UsageRecord::default()
            },
        )
    }

    fn insert_pricing_if_absent(
        &mut self,
        model_ids: &[String],
        config: &PricingConfig,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO pricing
                 (model, billing_mode, input_price, output_price, cached_input_price, price_per_request, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            let now = Self::now();
            for id in model_ids {
                stmt.execute(params![
                    id,
                    config.billing_mode.as_str(),
                    config.token.input_price_per_million,
                    config.token.output_price_per_million,
                    config.token.cached_input_price_per_million,
                    config.price_per_request,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_pricing(&mut self, model_id: &str, config: &PricingConfig) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO pricing
             (model, billing_mode, input_price, output_price, cached_input_price, price_per_request, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                model_id,
                config.billing_mode.as_str(),
                config.token.input_price_per_million,
                config.token.output_price_per_million,
                config.token.cached_input_price_per_million,
                config.price_per_request,
                Self::now()
            ],
        )?;
        Ok(())
    }

    fn reset_all(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM usage", [])?;
        tx.execute("DELETE FROM pricing", [])?;
        tx.commit()?;
        Ok(())
    }
}

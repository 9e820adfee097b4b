// Append-only tabular stores: records are flattened, the first record of a
// store fixes its header.

mod csv_store;
mod flatten;
mod sqlite_store;

pub use csv_store::CsvStore;
pub use flatten::{cell, flatten};
pub use sqlite_store::SqliteStore;

use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;

use crate::error::{Error, Result};

pub trait Store {
    /// Appends one flattened row. Creates the store with a header taken from
    /// this row's keys when it does not exist yet.
    fn append_row(
        &self,
        store: &str,
        row: &Map<String, Value>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Serializes `record` and flattens it into a row. The record must be an
/// object.
pub fn to_row<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(flatten(&map)),
        Value::Null => Err(Error::InvalidRecord("null")),
        Value::Bool(_) => Err(Error::InvalidRecord("bool")),
        Value::Number(_) => Err(Error::InvalidRecord("number")),
        Value::String(_) => Err(Error::InvalidRecord("string")),
        Value::Array(_) => Err(Error::InvalidRecord("array")),
    }
}

/// Flattens `record` and appends it to `store`.
pub async fn append<S, T>(sink: &S, store: &str, record: &T) -> Result<()>
where
    S: Store,
    T: Serialize,
{
    let row = to_row(record)?;
    sink.append_row(store, &row).await
}

/// Store names become file or table names, so only `[A-Za-z0-9_-]+` is allowed.
pub fn validate_store_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidStoreName(name.to_string()))
    }
}

/// The configured backend.
pub enum StoreBackend {
    Csv(CsvStore),
    Sqlite(SqliteStore),
}

impl Store for StoreBackend {
    async fn append_row(&self, store: &str, row: &Map<String, Value>) -> Result<()> {
        match self {
            StoreBackend::Csv(s) => s.append_row(store, row).await,
            StoreBackend::Sqlite(s) => s.append_row(store, row).await,
        }
    }
}

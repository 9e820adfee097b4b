// SQLite tables, one per store. The table's columns play the role of the header.

use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions,
};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

use super::{Store, validate_store_name};
use crate::error::Result;

pub struct SqliteStore {
    pool: SqlitePool,
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_value<'q>(
    q: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => q.bind(None::<String>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => q.bind(i),
            None => q.bind(n.as_f64()),
        },
        Value::String(s) => q.bind(s.clone()),
        other => q.bind(other.to_string()),
    }
}

impl SqliteStore {
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    /// Column names of `store` in table order; empty when the table is missing.
    pub async fn columns(&self, store: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM pragma_table_info($1) ORDER BY cid")
            .bind(store)
            .fetch_all(&self.pool)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row.try_get::<String, _>("name")?);
        }
        Ok(out)
    }

    pub async fn count(&self, store: &str) -> Result<i64> {
        validate_store_name(store)?;
        let sql = format!("SELECT COUNT(*) AS n FROM {}", quote_ident(store));
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.try_get("n")?)
    }

    async fn create_table(&self, store: &str, row: &Map<String, Value>) -> Result<Vec<String>> {
        let columns: Vec<String> = row.keys().cloned().collect();
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(store),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        debug!(store, columns = columns.len(), "created store table");
        Ok(columns)
    }
}

impl Store for SqliteStore {
    #[instrument(skip(self, row), fields(store_backend = "sqlite", operation = "append_row"))]
    async fn append_row(&self, store: &str, row: &Map<String, Value>) -> Result<()> {
        validate_store_name(store)?;
        let mut columns = self.columns(store).await?;
        if columns.is_empty() {
            columns = self.create_table(store, row).await?;
        }
        let present: Vec<&String> = columns.iter().filter(|c| row.contains_key(*c)).collect();
        if present.len() < row.len() {
            debug!(
                store,
                dropped = row.len() - present.len(),
                "columns not in table were dropped"
            );
        }
        if present.is_empty() {
            // Same as the CSV backend's row of empty cells.
            let sql = format!("INSERT INTO {} DEFAULT VALUES", quote_ident(store));
            sqlx::query(&sql).execute(&self.pool).await?;
            return Ok(());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(store),
            present
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            (1..=present.len())
                .map(|i| format!("${i}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut q = sqlx::query(&sql);
        for c in &present {
            q = bind_value(q, &row[c.as_str()]);
        }
        q.execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn first_append_creates_table_from_row_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metrics.db");
        let store = SqliteStore::connect(path.to_str().unwrap()).await.unwrap();
        assert!(store.columns("containers_info").await.unwrap().is_empty());

        store
            .append_row(
                "containers_info",
                &row(json!({"id": "c1", "metrics.0.percent": 50.0, "up": true})),
            )
            .await
            .unwrap();
        assert_eq!(
            store.columns("containers_info").await.unwrap(),
            ["id", "metrics.0.percent", "up"]
        );
        assert_eq!(store.count("containers_info").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn later_appends_insert_into_existing_columns() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metrics.db");
        let store = SqliteStore::connect(path.to_str().unwrap()).await.unwrap();
        store
            .append_row("s", &row(json!({"a": 1, "b": "x"})))
            .await
            .unwrap();
        store
            .append_row("s", &row(json!({"b": "y", "extra": null})))
            .await
            .unwrap();
        assert_eq!(store.columns("s").await.unwrap(), ["a", "b"]);
        assert_eq!(store.count("s").await.unwrap(), 2);

        let rows = sqlx::query("SELECT a, b FROM s ORDER BY rowid")
            .fetch_all(&store.pool)
            .await
            .unwrap();
        let a: Option<i64> = rows[1].try_get("a").unwrap();
        let b: String = rows[1].try_get("b").unwrap();
        assert_eq!(a, None);
        assert_eq!(b, "y");
    }

    #[tokio::test]
    async fn record_with_no_known_columns_still_adds_a_null_row() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metrics.db");
        let store = SqliteStore::connect(path.to_str().unwrap()).await.unwrap();
        store.append_row("s", &row(json!({"a": 1}))).await.unwrap();
        store.append_row("s", &row(json!({"z": 2}))).await.unwrap();
        assert_eq!(store.columns("s").await.unwrap(), ["a"]);
        assert_eq!(store.count("s").await.unwrap(), 2);

        let rows = sqlx::query("SELECT a FROM s ORDER BY rowid")
            .fetch_all(&store.pool)
            .await
            .unwrap();
        let first: Option<i64> = rows[0].try_get("a").unwrap();
        let second: Option<i64> = rows[1].try_get("a").unwrap();
        assert_eq!(first, Some(1));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn append_rejects_invalid_store_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metrics.db");
        let store = SqliteStore::connect(path.to_str().unwrap()).await.unwrap();
        let err = store
            .append_row("bad name", &row(json!({"a": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidStoreName(_)));
    }
}

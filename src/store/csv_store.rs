// CSV files, one per store, under a directory.

use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use super::{Store, cell, validate_store_name};
use crate::error::Result;

pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, store: &str) -> Result<PathBuf> {
        validate_store_name(store)?;
        Ok(self.dir.join(format!("{store}.csv")))
    }
}

/// Appends `row` to the CSV file at `path`, writing the header first when the
/// file is missing or empty. Blocking.
fn append_blocking(path: &Path, store: &str, row: &Map<String, Value>) -> Result<()> {
    match read_header(path)? {
        Some(header) => {
            let file = OpenOptions::new().append(true).open(path)?;
            let mut w = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            let dropped: Vec<&String> =
                row.keys().filter(|k| !header.contains(*k)).collect();
            if !dropped.is_empty() {
                debug!(store, ?dropped, "columns not in header were dropped");
            }
            w.write_record(
                header
                    .iter()
                    .map(|h| row.get(h).map(cell).unwrap_or_default()),
            )?;
            w.flush()?;
        }
        None => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            let mut w = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            w.write_record(row.keys())?;
            w.write_record(row.values().map(cell))?;
            w.flush()?;
            debug!(store, path = %path.display(), columns = row.len(), "created store");
        }
    }
    Ok(())
}

/// Header of an existing store, or `None` when the file is missing or empty.
fn read_header(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut r = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    match r.records().next() {
        Some(record) => Ok(Some(record?.iter().map(String::from).collect())),
        None => Ok(None),
    }
}

impl Store for CsvStore {
    #[instrument(skip(self, row), fields(store_backend = "csv", operation = "append_row"))]
    async fn append_row(&self, store: &str, row: &Map<String, Value>) -> Result<()> {
        let path = self.path_for(store)?;
        let store = store.to_string();
        let row = row.clone();
        tokio::task::spawn_blocking(move || append_blocking(&path, &store, &row)).await?
    }
}

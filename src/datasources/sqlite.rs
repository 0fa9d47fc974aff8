use super::{DatasetLoad, DatasetSource};
use crate::error::{Result, SoilScanError};
use crate::models::RawRecord;
use regex_lite::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const DEFAULT_TABLE: &str = "crop_dataset";

/// Crop reference table inside an SQLite file, opened read-only on every load.
#[derive(Debug, Clone)]
pub struct SqliteDataset {
    path: PathBuf,
    table: String,
}

impl SqliteDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn open(&self) -> Result<Connection> {
        if !self.path.exists() {
            return Err(SoilScanError::DataSourceUnavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }
        if !is_identifier(&self.table) {
            return Err(SoilScanError::InvalidData(format!(
                "invalid table name '{}'",
                self.table
            )));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    pub fn read_rows(&self) -> Result<Vec<RawRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\"", self.table))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = RawRecord::new();
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), to_json(row.get_ref(i)?));
            }
            records.push(record);
        }
        Ok(records)
    }

    pub fn row_count(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }
}

impl DatasetSource for SqliteDataset {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load(&self) -> DatasetLoad {
        match self.read_rows() {
            Ok(records) => DatasetLoad::Records(records),
            Err(e) => DatasetLoad::Unavailable(e.to_string()),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

//! Experiment observations loaded from CSV.
//!
//! A [`Dataset`] keeps every column of the source file untouched so that a
//! cleaned dataset can be written back with the same shape, while the four
//! columns the analysis needs (user, group, page, conversion flag) are
//! resolved to indices once at load time.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Names of the columns the analysis reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Column holding the user identifier.
    pub user: String,
    /// Column holding the experiment group label.
    pub group: String,
    /// Column holding the page the user landed on.
    pub page: String,
    /// Column holding the 0/1 conversion flag.
    pub converted: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            user: "user_id".to_string(),
            group: "group".to_string(),
            page: "landing_page".to_string(),
            converted: "converted".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    user: usize,
    group: usize,
    page: usize,
    converted: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, names: &ColumnNames) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::missing_column(name))
        };
        Ok(Self {
            user: find(&names.user)?,
            group: find(&names.group)?,
            page: find(&names.page)?,
            converted: find(&names.converted)?,
        })
    }
}

/// A table of experiment observations.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: StringRecord,
    records: Vec<StringRecord>,
    columns: ColumnNames,
    index: ColumnIndex,
}

impl Dataset {
    /// Read a CSV file with a header row.
    pub fn from_path(path: impl AsRef<Path>, columns: &ColumnNames) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io_with_path(e, path))?;
        let dataset = Self::from_reader(file, columns)?;
        tracing::debug!(path = %path.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    /// Read CSV with a header row from any reader.
    pub fn from_reader<R: Read>(reader: R, columns: &ColumnNames) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let index = ColumnIndex::resolve(&headers, columns)?;
        let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            headers,
            records,
            columns: columns.clone(),
            index,
        })
    }

    /// Build a dataset sharing this one's header but holding `records`.
    pub(crate) fn with_records(&self, records: Vec<StringRecord>) -> Self {
        Self {
            headers: self.headers.clone(),
            records,
            columns: self.columns.clone(),
            index: self.index,
        }
    }

    /// Write the dataset as CSV to `path`, creating parent directories.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
        }
        let file = File::create(path).map_err(|e| Error::io_with_path(e, path))?;
        self.write_to(file)?;
        tracing::debug!(path = %path.display(), rows = self.len(), "wrote dataset");
        Ok(())
    }

    /// Write the dataset as CSV (header first, no index column).
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(&self.headers)?;
        for record in &self.records {
            wtr.write_record(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The header row.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub(crate) fn records(&self) -> &[StringRecord] {
        &self.records
    }

    /// User identifier of row `i`.
    pub fn user(&self, i: usize) -> &str {
        field(&self.records[i], self.index.user)
    }

    /// Group label of row `i`.
    pub fn group(&self, i: usize) -> &str {
        field(&self.records[i], self.index.group)
    }

    /// Landing page of row `i`.
    pub fn page(&self, i: usize) -> &str {
        field(&self.records[i], self.index.page)
    }

    /// Conversion flag of row `i`.
    pub fn converted(&self, i: usize) -> Result<bool> {
        let raw = field(&self.records[i], self.index.converted);
        parse_flag(raw).ok_or_else(|| Error::InvalidValue {
            row: i + 1,
            column: self.columns.converted.clone(),
            value: raw.to_string(),
        })
    }

    /// Row count per group label, in first-seen order.
    pub fn group_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for i in 0..self.len() {
            let group = self.group(i);
            match counts.iter_mut().find(|(g, _)| g == group) {
                Some((_, n)) => *n += 1,
                None => counts.push((group.to_string(), 1)),
            }
        }
        counts
    }
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or_default()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

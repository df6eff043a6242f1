//! Header-keyed CSV reading

use crate::error::Result;
use std::path::Path;

/// One CSV row as `(column, value)` pairs in file column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRecord {
    pub columns: Vec<(String, String)>,
}

impl CsvRecord {
    /// Value of the first column named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Read every row of a headed CSV file. Rows must have as many values as
/// the header.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<CsvRecord>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())?;
    read_records(reader)
}

/// Same as [`read_csv`] over an in-memory document
pub fn parse_csv(text: &str) -> Result<Vec<CsvRecord>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    read_records(reader)
}

fn read_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<CsvRecord>> {
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let columns = headers
            .iter()
            .zip(row.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        records.push(CsvRecord { columns });
    }

    Ok(records)
}

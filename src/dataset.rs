//! In-memory dataset snapshot: named columns of typed cells.
//!
//! A snapshot is immutable once loaded. Cell types follow the column-role
//! mapping: numeric columns parse to integer/float cells, datetime columns
//! to chrono temporals, everything else stays text. Empty fields and
//! placeholder tokens become the missing marker.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::debug;

use crate::{
    data::{Cell, parse_datetime_cell, parse_numeric_cell, parse_text_cell},
    error::ProfileError,
    io_utils,
    mapping::{ColumnMapping, ColumnRole},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: BTreeMap<String, Vec<Cell>>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from pre-typed columns. Intended for library callers
    /// and tests; CSV ingestion goes through [`Dataset::from_csv`].
    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Cell>)>,
    {
        let columns: BTreeMap<String, Vec<Cell>> = columns.into_iter().collect();
        let row_count = columns.values().map(Vec::len).max().unwrap_or(0);
        Dataset { columns, row_count }
    }

    /// Load a CSV snapshot, typing each column according to the mapping.
    pub fn from_csv(
        path: &Path,
        mapping: &ColumnMapping,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        let roles: Vec<ColumnRole> = headers.iter().map(|name| mapping.role_of(name)).collect();

        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        let mut row_count = 0usize;
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)?;
            for (col_idx, raw) in decoded.iter().enumerate().take(headers.len()) {
                let cell = parse_cell(raw, roles[col_idx]).with_context(|| {
                    format!("Parsing row {} column '{}'", row_idx + 2, headers[col_idx])
                })?;
                columns[col_idx].push(cell);
            }
            row_count += 1;
        }
        debug!(
            "Loaded {} row(s) across {} column(s) from {:?}",
            row_count,
            headers.len(),
            path
        );

        Ok(Dataset {
            columns: headers.into_iter().zip(columns).collect(),
            row_count,
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Index a declared column; absence is a collaborator contract
    /// violation surfaced as [`ProfileError::MissingColumn`].
    pub fn column(&self, name: &str) -> Result<&[Cell], ProfileError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ProfileError::MissingColumn(name.to_string()))
    }
}

fn parse_cell(raw: &str, role: ColumnRole) -> Result<Cell> {
    match role {
        ColumnRole::Numeric => parse_numeric_cell(raw),
        ColumnRole::Datetime => parse_datetime_cell(raw),
        ColumnRole::Categorical | ColumnRole::Text => Ok(parse_text_cell(raw)),
    }
}

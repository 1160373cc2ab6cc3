// src/store/table.rs
//
// Helpers for working with the written CSVs afterwards: load one, keep the
// rows matching a set of column filters, save the result.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};
use tracing::{debug, warn};

use super::write_atomic;

/// Column name to the set of accepted values.
pub type Filters = BTreeMap<String, BTreeSet<String>>;

/// An untyped CSV table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn load_table(path: &Path) -> Result<DataTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {:?}", path))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {:?}", path))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("reading row {} of {:?}", i + 1, path))?;
        let mut row: Vec<String> = rec.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    debug!(path = %path.display(), rows = rows.len(), "loaded table");
    Ok(DataTable { headers, rows })
}

/// Keep rows whose value in every filtered column is one of the accepted
/// values. Filters on columns the table lacks are skipped.
pub fn apply_filters(table: &DataTable, filters: &Filters) -> DataTable {
    let active: Vec<(usize, &BTreeSet<String>)> = filters
        .iter()
        .filter_map(|(col, accepted)| match table.column_index(col) {
            Some(idx) => Some((idx, accepted)),
            None => {
                warn!(column = %col, "filter column not in table; ignoring");
                None
            }
        })
        .collect();

    let rows = table
        .rows
        .iter()
        .filter(|row| {
            active
                .iter()
                .all(|(idx, accepted)| row.get(*idx).is_some_and(|v| accepted.contains(v)))
        })
        .cloned()
        .collect();

    DataTable {
        headers: table.headers.clone(),
        rows,
    }
}

pub fn save_table(table: &DataTable, path: &Path) -> Result<()> {
    write_atomic(path, |w| {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(&table.headers)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    })
}

/// Parse `COL=V1,V2` into a filter entry.
pub fn parse_filter(spec: &str) -> Result<(String, BTreeSet<String>)> {
    let (col, values) = spec
        .split_once('=')
        .with_context(|| format!("filter `{}` is not of the form COL=V1,V2", spec))?;
    let values = values.split(',').map(|v| v.trim().to_string()).collect();
    Ok((col.trim().to_string(), values))
}

/// Parse every `COL=V1,V2` spec; repeated columns accept the union of their values.
pub fn parse_filters<S: AsRef<str>>(specs: &[S]) -> Result<Filters> {
    let mut filters = Filters::new();
    for spec in specs {
        let (col, values) = parse_filter(spec.as_ref())?;
        filters.entry(col).or_default().extend(values);
    }
    Ok(filters)
}

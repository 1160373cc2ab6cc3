// src/process/bio.rs

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use super::raw_table::RawTable;
use super::TableKind;
use crate::error::ExtractionError;
use crate::schema::BIO_FIELDS;
use crate::AthleteId;

/// One athlete's biography, transposed from the label/value table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BioRecord {
    pub athlete_id: AthleteId,
    /// Every standard field is present (possibly `None`); extra labels follow in page order.
    fields: Vec<(String, Option<String>)>,
}

impl BioRecord {
    /// A record with every standard field unset.
    pub fn empty(athlete_id: AthleteId) -> Self {
        Self {
            athlete_id,
            fields: BIO_FIELDS.iter().map(|f| (f.to_string(), None)).collect(),
        }
    }

    pub fn set(&mut self, field: &str, value: Option<String>) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Field names in record order, `athlete_id` excluded.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for BioRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("athlete_id", &self.athlete_id)?;
        map.end()
    }
}

/// Transpose the biography table into a single record for `athlete_id`.
///
/// The first column holds attribute names, the second their values. Rows
/// without a name are skipped; fewer than two columns is malformed.
pub fn extract_bio(table: &RawTable, athlete_id: AthleteId) -> Result<BioRecord, ExtractionError> {
    let (label_col, value_col) = match table.headers.as_slice() {
        [label, value, ..] => (label.as_str(), value.as_str()),
        _ => {
            return Err(ExtractionError::malformed(
                TableKind::Biography,
                format!("expected label and value columns, found {}", table.headers.len()),
            ))
        }
    };

    let mut record = BioRecord::empty(athlete_id);
    for (i, row) in table.rows.iter().enumerate() {
        let Some(label) = row.get(label_col) else {
            debug!(athlete_id, row = i, "skipping biography row without a label");
            continue;
        };
        record.set(label, row.get(value_col).map(str::to_string));
    }
    Ok(record)
}

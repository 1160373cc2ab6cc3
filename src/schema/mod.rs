pub mod arrow;
pub mod types;

pub use arrow::{build_arrow_schema, map_to_arrow_type};
pub use types::{Column, ColumnType, TabularRecord};

use crate::process::BioRecord;

pub const ATHLETE_ID: &str = "athlete_id";

/// Biography labels every record carries, present or not.
pub const BIO_FIELDS: &[&str] = &["Roles", "Sex", "Full name", "Used name", "Born", "Died", "NOC"];

/// `results.csv` layout: the row's own cells, then the id, then the carried NOC and discipline.
pub const RESULT_COLUMNS: &[&str] = &[
    "Games",
    "Event",
    "Team",
    "Pos",
    "Medal",
    "As",
    ATHLETE_ID,
    "NOC",
    "Discipline",
];

/// Standard biography columns and `athlete_id`, then any extra labels in first-seen order.
pub fn bio_columns(records: &[BioRecord]) -> Vec<Column> {
    let mut cols: Vec<Column> = BIO_FIELDS.iter().map(|f| Column::text(*f)).collect();
    cols.push(Column::athlete_id());
    for rec in records {
        for name in rec.field_names() {
            if !cols.iter().any(|c| c.name == name) {
                cols.push(Column::text(name));
            }
        }
    }
    cols
}

pub fn result_columns() -> Vec<Column> {
    RESULT_COLUMNS
        .iter()
        .map(|name| {
            if *name == ATHLETE_ID {
                Column::athlete_id()
            } else {
                Column::text(*name)
            }
        })
        .collect()
}

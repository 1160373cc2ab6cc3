// src/store/csv_out.rs

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::io::Write;

use crate::schema::{Column, ColumnType, TabularRecord};

/// Header row then one row per record; null cells become empty fields.
pub fn write_records<W: Write, R: TabularRecord>(
    out: W,
    cols: &[Column],
    records: &[R],
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(out);
    wtr.write_record(cols.iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;

    let mut line: Vec<String> = Vec::with_capacity(cols.len());
    for rec in records {
        line.clear();
        line.extend(cols.iter().map(|c| match c.ty {
            ColumnType::AthleteId => rec.athlete_id().to_string(),
            ColumnType::Text => rec.text(&c.name).unwrap_or_default().to_string(),
        }));
        wtr.write_record(&line)
            .with_context(|| format!("writing CSV row for athlete {}", rec.athlete_id()))?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

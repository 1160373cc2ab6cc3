// src/store/parquet_out.rs

use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;

use crate::schema::arrow::{build_arrow_schema, to_record_batch};
use crate::schema::{Column, TabularRecord};

/// Write all records as a single Snappy-compressed row group.
pub fn write_records<W: Write + Send, R: TabularRecord>(
    out: W,
    cols: &[Column],
    records: &[R],
) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(out, build_arrow_schema(cols), Some(props))
        .context("initializing Parquet writer")?;
    if !records.is_empty() {
        let batch = to_record_batch(cols, records)?;
        writer.write(&batch).context("writing batch to Parquet")?;
    }
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ResultRow;
    use crate::schema::result_columns;
    use arrow::array::{Array, StringArray, UInt32Array};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_results_read_back() {
        let rows = vec![
            ResultRow {
                athlete_id: 7,
                games: Some("2000".into()),
                noc: Some("USA".into()),
                discipline_event: Some("100m".into()),
                role: Some("Competitor".into()),
                event: None,
                team: None,
                position: Some("1".into()),
                medal: Some("Gold".into()),
            },
            ResultRow {
                athlete_id: 7,
                games: Some("2004".into()),
                noc: Some("USA".into()),
                discipline_event: Some("200m".into()),
                role: Some("Competitor".into()),
                event: None,
                team: None,
                position: Some("5".into()),
                medal: None,
            },
        ];
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.parquet");
        write_records(File::create(&path).unwrap(), &result_columns(), &rows).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);

        let schema = batch.schema();
        let medal_idx = schema.index_of("Medal").unwrap();
        let medal = batch
            .column(medal_idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(medal.value(0), "Gold");
        assert!(medal.is_null(1));

        let id_idx = schema.index_of("athlete_id").unwrap();
        let ids = batch
            .column(id_idx)
            .as_any()
            .downcast_ref::<UInt32Array>()
            .unwrap();
        assert_eq!(ids.value(1), 7);
    }
}

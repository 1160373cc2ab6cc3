// src/schema/arrow.rs

use anyhow::Result;
use arrow::{
    array::{ArrayRef, StringArray, UInt32Array},
    datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::types::{Column, ColumnType, TabularRecord};

/// Map an output column type into an Arrow DataType.
pub fn map_to_arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::AthleteId => DataType::UInt32,
        ColumnType::Text => DataType::Utf8,
    }
}

/// Build an ArrowSchema (inside an Arc) from output columns. The id is never null.
pub fn build_arrow_schema(cols: &[Column]) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| {
            let nullable = col.ty != ColumnType::AthleteId;
            ArrowField::new(&col.name, map_to_arrow_type(col.ty), nullable)
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// Lay records out column by column into a single batch.
pub fn to_record_batch<R: TabularRecord>(cols: &[Column], records: &[R]) -> Result<RecordBatch> {
    let schema = build_arrow_schema(cols);
    let arrays: Vec<ArrayRef> = cols
        .iter()
        .map(|col| match col.ty {
            ColumnType::AthleteId => Arc::new(UInt32Array::from_iter_values(
                records.iter().map(|r| r.athlete_id()),
            )) as ArrayRef,
            ColumnType::Text => Arc::new(
                records
                    .iter()
                    .map(|r| r.text(&col.name))
                    .collect::<StringArray>(),
            ) as ArrayRef,
        })
        .collect();

    RecordBatch::try_new(schema, arrays).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::BioRecord;
    use crate::schema::bio_columns;
    use arrow::array::Array;

    #[test]
    fn test_bio_batch_shape() -> Result<()> {
        let mut a = BioRecord::empty(3);
        a.set("Sex", Some("Female".into()));
        let b = BioRecord::empty(4);
        let records = vec![a, b];

        let cols = bio_columns(&records);
        let batch = to_record_batch(&cols, &records)?;
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), cols.len());

        let sex = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("Sex must be Utf8");
        assert_eq!(sex.value(0), "Female");
        assert!(sex.is_null(1));

        let ids = batch
            .column(7)
            .as_any()
            .downcast_ref::<UInt32Array>()
            .expect("athlete_id must be UInt32");
        assert_eq!(ids.values().to_vec(), vec![3, 4]);
        Ok(())
    }
}

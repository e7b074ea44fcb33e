//! Parquet decoding of address partitions with column projection.

use super::types::{AddressRecord, BackendError};
use crate::projection::Column;
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;

/// Columns that every partition file must carry.
const REQUIRED: [Column; 3] = [Column::Id, Column::Longitude, Column::Latitude];

/// Decodes a partition file, reading only `columns`.
///
/// `id`, `longitude` and `latitude` are always read and must exist. Other
/// requested columns that the file lacks decode as absent values. Text
/// columns of any type castable to UTF-8 are accepted, so integer
/// postcodes or house numbers read as their decimal form.
pub fn decode_partition(data: Bytes, columns: &[Column]) -> Result<Vec<AddressRecord>, BackendError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .map_err(|e| BackendError::Decode(format!("parquet reader init failed: {e}")))?;

    let schema = builder.schema().clone();
    for column in REQUIRED {
        if schema.index_of(column.name()).is_err() {
            return Err(BackendError::MissingColumn(column.name().to_string()));
        }
    }

    let wanted: Vec<Column> = Column::ALL
        .iter()
        .copied()
        .filter(|c| REQUIRED.contains(c) || columns.contains(c))
        .collect();
    let indices: Vec<usize> = wanted
        .iter()
        .filter_map(|c| schema.index_of(c.name()).ok())
        .collect();

    let mask = ProjectionMask::roots(builder.parquet_schema(), indices);
    let reader = builder
        .with_projection(mask)
        .build()
        .map_err(|e| BackendError::Decode(format!("parquet reader build failed: {e}")))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch =
            batch.map_err(|e| BackendError::Decode(format!("parquet read batch failed: {e}")))?;
        decode_batch(&batch, &wanted, &mut rows)?;
    }
    Ok(rows)
}

fn decode_batch(
    batch: &RecordBatch,
    wanted: &[Column],
    out: &mut Vec<AddressRecord>,
) -> Result<(), BackendError> {
    let ids = text_column(batch, Column::Id)?
        .ok_or_else(|| BackendError::MissingColumn(Column::Id.name().to_string()))?;
    let lons = float_column(batch, Column::Longitude)?;
    let lats = float_column(batch, Column::Latitude)?;

    let mut text_columns = Vec::new();
    for column in wanted {
        if column.is_numeric() || *column == Column::Id {
            continue;
        }
        if let Some(values) = text_column(batch, *column)? {
            text_columns.push((*column, values));
        }
    }

    out.reserve(batch.num_rows());
    for row in 0..batch.num_rows() {
        // Rows without coordinates cannot be placed and are skipped.
        if ids.is_null(row) || lons.is_null(row) || lats.is_null(row) {
            continue;
        }
        let mut record = AddressRecord::new(ids.value(row), lats.value(row), lons.value(row));
        for (column, values) in &text_columns {
            if !values.is_null(row) {
                record.set_text(*column, Some(values.value(row).to_string()));
            }
        }
        out.push(record);
    }
    Ok(())
}

fn column_array(batch: &RecordBatch, column: Column) -> Option<&ArrayRef> {
    batch.column_by_name(column.name())
}

fn text_column(batch: &RecordBatch, column: Column) -> Result<Option<StringArray>, BackendError> {
    let Some(array) = column_array(batch, column) else {
        return Ok(None);
    };
    let casted = cast(array, &DataType::Utf8)
        .map_err(|e| BackendError::Decode(format!("column '{}' is not text: {e}", column)))?;
    casted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .map(Some)
        .ok_or_else(|| BackendError::Decode(format!("column '{}' is not StringArray", column)))
}

fn float_column(batch: &RecordBatch, column: Column) -> Result<Float64Array, BackendError> {
    let array = column_array(batch, column)
        .ok_or_else(|| BackendError::MissingColumn(column.name().to_string()))?;
    let casted = cast(array, &DataType::Float64)
        .map_err(|e| BackendError::Decode(format!("column '{}' is not numeric: {e}", column)))?;
    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| BackendError::Decode(format!("column '{}' is not Float64Array", column)))
}

//! Column access helpers over Arrow record batches.
//!
//! A dataset is a plain [`RecordBatch`]. These helpers resolve columns by
//! name and cast them into the representation a test needs. Casts are strict:
//! a value that cannot be converted is an error, never a silent null.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, StringArray};
use arrow::compute::{can_cast_types, cast_with_options, filter_record_batch, CastOptions};
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{EvidenceError, Result};

/// Boolean row selector. Null entries behave as `false`.
pub type Mask = BooleanArray;

/// Returns the named column or [`EvidenceError::ColumnNotFound`].
pub fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| EvidenceError::column_not_found(name))
}

/// Casts an array to `to`, rejecting values that do not convert.
pub fn cast_strict(array: &ArrayRef, name: &str, to: &DataType) -> Result<ArrayRef> {
    if array.data_type() == to {
        return Ok(Arc::clone(array));
    }
    if !can_cast_types(array.data_type(), to) {
        return Err(EvidenceError::type_mismatch(
            name,
            to.to_string(),
            array.data_type().to_string(),
        ));
    }
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    Ok(cast_with_options(array, to, &options)?)
}

/// Named column as `Float64`.
pub fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    let array = cast_strict(column(batch, name)?, name, &DataType::Float64)?;
    Ok(array.as_primitive::<Float64Type>().clone())
}

/// Named column cast to boolean. Integers are `true` when non-zero.
pub fn flag_column(batch: &RecordBatch, name: &str) -> Result<BooleanArray> {
    let array = cast_strict(column(batch, name)?, name, &DataType::Boolean)?;
    Ok(array.as_boolean().clone())
}

/// Named column as string labels.
pub fn label_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    let array = cast_strict(column(batch, name)?, name, &DataType::Utf8)?;
    Ok(array.as_string::<i32>().clone())
}

/// Fails unless the mask has exactly `rows` entries.
pub fn check_mask_len(mask: &Mask, rows: usize) -> Result<()> {
    if mask.len() != rows {
        return Err(EvidenceError::ShapeMismatch {
            expected: rows,
            found: mask.len(),
        });
    }
    Ok(())
}

/// Keeps only the rows selected by `mask`.
pub fn filter_rows(batch: &RecordBatch, mask: &Mask) -> Result<RecordBatch> {
    check_mask_len(mask, batch.num_rows())?;
    Ok(filter_record_batch(batch, mask)?)
}

/// Builds a batch with the given row count, tolerating zero columns.
pub fn batch_from_columns(
    fields: Vec<Field>,
    columns: Vec<ArrayRef>,
    rows: usize,
) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

/// Returns a copy of `batch` with `name` set to `array`.
///
/// An existing column keeps its position. A new column is appended.
pub fn upsert_column(batch: &RecordBatch, name: &str, array: ArrayRef) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    if array.len() != rows {
        return Err(EvidenceError::ShapeMismatch {
            expected: rows,
            found: array.len(),
        });
    }

    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    let field = Field::new(name, array.data_type().clone(), array.null_count() > 0);

    match schema.index_of(name) {
        Ok(idx) => {
            fields[idx] = field;
            columns[idx] = array;
        }
        Err(_) => {
            fields.push(field);
            columns.push(array);
        }
    }

    batch_from_columns(fields, columns, rows)
}

/// Pairs of non-null `(y, x)` values, dropping rows where either is null.
pub(crate) fn complete_pairs(y: &Float64Array, x: &Float64Array) -> (Vec<f64>, Vec<f64>) {
    let mut ys = Vec::with_capacity(y.len());
    let mut xs = Vec::with_capacity(x.len());
    for (yv, xv) in y.iter().zip(x.iter()) {
        if let (Some(yv), Some(xv)) = (yv, xv) {
            ys.push(yv);
            xs.push(xv);
        }
    }
    (ys, xs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("flag", DataType::Int64, false),
            Field::new("label", DataType::Utf8, false),
            Field::new("value", DataType::Float64, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![0, 1, 2, 0])),
                Arc::new(StringArray::from(vec!["a", "b", "a", "c"])),
                Arc::new(Float64Array::from(vec![Some(1.0), None, Some(3.0), Some(4.0)])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_missing_column() {
        let batch = sample_batch();
        let err = column(&batch, "nope").unwrap_err();
        assert!(matches!(err, EvidenceError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_flag_cast_nonzero_is_true() {
        let batch = sample_batch();
        let flags = flag_column(&batch, "flag").unwrap();
        let flags: Vec<bool> = flags.iter().map(|v| v.unwrap()).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn test_strict_cast_rejects_bad_values() {
        let batch = sample_batch();
        assert!(float_column(&batch, "label").is_err());
        let floats = float_column(&batch, "flag").unwrap();
        assert_eq!(floats.value(2), 2.0);
    }

    #[test]
    fn test_filter_rows() {
        let batch = sample_batch();
        let mask = BooleanArray::from(vec![true, false, true, false]);
        let filtered = filter_rows(&batch, &mask).unwrap();
        assert_eq!(filtered.num_rows(), 2);

        let short = BooleanArray::from(vec![true]);
        assert!(matches!(
            filter_rows(&batch, &short),
            Err(EvidenceError::ShapeMismatch {
                expected: 4,
                found: 1
            })
        ));
    }

    #[test]
    fn test_upsert_keeps_position() {
        let batch = sample_batch();
        let replaced = upsert_column(
            &batch,
            "label",
            Arc::new(Float64Array::from(vec![0.0, 0.0, 0.0, 0.0])),
        )
        .unwrap();
        assert_eq!(replaced.schema().index_of("label").unwrap(), 1);
        assert_eq!(replaced.column(1).data_type(), &DataType::Float64);

        let appended = upsert_column(
            &batch,
            "extra",
            Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
        )
        .unwrap();
        assert_eq!(appended.num_columns(), 4);
    }

    #[test]
    fn test_zero_column_batch_keeps_rows() {
        let batch = batch_from_columns(vec![], vec![], 7).unwrap();
        assert_eq!(batch.num_rows(), 7);
        assert_eq!(batch.num_columns(), 0);
    }

    #[test]
    fn test_complete_pairs_drops_nulls() {
        let y = Float64Array::from(vec![Some(1.0), None, Some(3.0)]);
        let x = Float64Array::from(vec![Some(0.5), Some(1.5), None]);
        let (ys, xs) = complete_pairs(&y, &x);
        assert_eq!(ys, vec![1.0]);
        assert_eq!(xs, vec![0.5]);
    }
}

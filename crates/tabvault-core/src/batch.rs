//! Validated record batches.
//!
//! A [`Batch`] is only constructed after every record has been conformed to
//! the target table's layout, so the loader never opens a transaction for data
//! that is known to be invalid.

use serde_json::Value as JsonValue;

use crate::catalog::{TableId, TableLayout};
use crate::collections::NonEmptyVec;
use crate::error::{CoreError, CoreResult};
use crate::record::{Record, Scalar};

/// A non-empty, layout-conformant set of records for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    table: TableId,
    records: NonEmptyVec<Record>,
}

impl Batch {
    /// Validate records restored from an artifact.
    ///
    /// Fields outside the table layout are rejected.
    pub fn from_records(table: TableId, records: Vec<Record>) -> CoreResult<Self> {
        let layout = table.layout();
        let conformed = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                if let Some(extra) = record.fields().find(|f| layout.column(f).is_none()) {
                    return Err(invalid(table, index, format!("unknown field '{extra}'")));
                }
                conform(&layout, index, &record)
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Self::new(table, conformed)
    }

    /// Validate JSON objects supplied by API callers.
    ///
    /// Unknown keys are ignored; nested arrays and objects are rejected.
    pub fn from_json(table: TableId, entries: Vec<JsonValue>) -> CoreResult<Self> {
        let layout = table.layout();
        let conformed = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let JsonValue::Object(object) = entry else {
                    return Err(invalid(table, index, "entry is not a JSON object"));
                };

                let mut record = Record::new();
                for column in layout.columns {
                    if let Some(value) = object.get(column.name) {
                        let scalar = json_to_scalar(value).ok_or_else(|| {
                            invalid(
                                table,
                                index,
                                format!("field '{}' is not a scalar value", column.name),
                            )
                        })?;
                        record.insert(column.name, scalar);
                    }
                }
                conform(&layout, index, &record)
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Self::new(table, conformed)
    }

    fn new(table: TableId, records: Vec<Record>) -> CoreResult<Self> {
        let records = NonEmptyVec::try_from(records).map_err(|_| CoreError::EmptyBatch {
            table: table.to_string(),
        })?;
        Ok(Self { table, records })
    }

    /// Reject batches above `max_rows`.
    pub fn ensure_max_rows(&self, max_rows: usize) -> CoreResult<()> {
        if self.records.len() > max_rows {
            return Err(CoreError::BatchTooLarge {
                table: self.table.to_string(),
                rows: self.records.len(),
                max: max_rows,
            });
        }
        Ok(())
    }

    pub fn table(&self) -> TableId {
        self.table
    }

    pub fn records(&self) -> &NonEmptyVec<Record> {
        &self.records
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

fn conform(layout: &TableLayout, index: usize, record: &Record) -> CoreResult<Record> {
    layout
        .columns
        .iter()
        .map(|column| {
            column
                .conform(record.get(column.name))
                .map(|value| (column.name.to_string(), value))
                .map_err(|reason| invalid(layout.table, index, reason))
        })
        .collect()
}

fn invalid(table: TableId, index: usize, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidRecord {
        table: table.to_string(),
        index,
        reason: reason.into(),
    }
}

fn json_to_scalar(value: &JsonValue) -> Option<Scalar> {
    match value {
        JsonValue::Null => Some(Scalar::Null),
        JsonValue::Bool(b) => Some(Scalar::Boolean(*b)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Scalar::Integer)
            .or_else(|| n.as_f64().map(Scalar::Float)),
        JsonValue::String(s) => Some(Scalar::Text(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

//! Record schemas and inference over fetched result sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::kind::PortableKind;
use crate::record::{Record, Scalar};

/// A named, typed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: PortableKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: PortableKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered field list plus the name of the record shape.
///
/// Field order is positional: it matches the column order of the result set
/// the schema was inferred from and the field order inside the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    name: String,
    fields: Vec<Field>,
}

impl RecordSchema {
    /// Build a schema, rejecting duplicate field names.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::encoding(
                    field.name.clone(),
                    "duplicate field name",
                ));
            }
        }

        Ok(Self {
            name: name.into(),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Column metadata as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    pub name: String,
    pub declared_type: Option<String>,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
        }
    }
}

/// A fully materialized query result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub source: String,
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Vec<Scalar>>,
}

impl ResultSet {
    pub fn new(
        source: impl Into<String>,
        columns: Vec<ResultColumn>,
        rows: Vec<Vec<Scalar>>,
    ) -> Self {
        Self {
            source: source.into(),
            columns,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Native type tag of a column.
    ///
    /// Falls back to the storage class of the first non-null value when the
    /// store reports no declared type, and to `null` for an all-null column.
    pub fn native_type(&self, column: usize) -> String {
        if let Some(declared) = self
            .columns
            .get(column)
            .and_then(|c| c.declared_type.as_deref())
            .filter(|t| !t.trim().is_empty())
        {
            return declared.to_string();
        }

        let first = self
            .rows
            .iter()
            .filter_map(|row| row.get(column))
            .find(|value| !value.is_null());

        match first {
            Some(Scalar::Integer(_)) => "integer",
            Some(Scalar::Float(_)) => "real",
            Some(Scalar::Boolean(_)) => "boolean",
            Some(Scalar::Text(_)) => "text",
            Some(Scalar::Null) | None => "null",
        }
        .to_string()
    }

    /// Conform every row to `schema`, pairing values with fields by position.
    pub fn into_records(self, schema: &RecordSchema) -> Vec<Record> {
        self.rows
            .into_iter()
            .map(|row| {
                schema
                    .fields()
                    .iter()
                    .zip(row)
                    .map(|(field, value)| (field.name.clone(), value.canonicalize(field.kind)))
                    .collect()
            })
            .collect()
    }

    /// Rows keyed by column name, values as fetched.
    pub fn row_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.name.clone(), value.clone()))
                    .collect()
            })
            .collect()
    }
}

/// Derive a record schema named after the result set's source.
///
/// Fails with [`CoreError::EmptyResult`] when no rows were fetched.
pub fn infer_schema(result_set: &ResultSet) -> CoreResult<RecordSchema> {
    if result_set.is_empty() {
        return Err(CoreError::EmptyResult {
            source_name: result_set.source.clone(),
        });
    }

    let fields = result_set
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let tag = result_set.native_type(index);
            Field::new(column.name.clone(), PortableKind::from_native_type(&tag))
        })
        .collect();

    let schema = RecordSchema::new(result_set.source.clone(), fields)?;
    tracing::debug!(
        source = %result_set.source,
        fields = schema.len(),
        rows = result_set.rows.len(),
        "Inferred record schema"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn jobs_result_set() -> ResultSet {
        ResultSet::new(
            "jobs",
            vec![
                ResultColumn::new("id", Some("INTEGER")),
                ResultColumn::new("job", Some("VARCHAR(50)")),
            ],
            vec![
                vec![Scalar::Integer(1), Scalar::Text("Engineer".into())],
                vec![Scalar::Integer(2), Scalar::Text("Analyst".into())],
            ],
        )
    }

    #[test]
    fn test_infer_schema_preserves_column_order() {
        let schema = infer_schema(&jobs_result_set()).unwrap();
        assert_eq!(schema.name(), "jobs");
        assert_eq!(
            schema.fields(),
            &[
                Field::new("id", PortableKind::Integer),
                Field::new("job", PortableKind::Text),
            ]
        );
    }

    #[test]
    fn test_infer_schema_rejects_empty_result() {
        let mut result_set = jobs_result_set();
        result_set.rows.clear();

        let error = infer_schema(&result_set).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::EmptyResult);
        assert!(error.to_string().contains("jobs"));
    }

    #[test]
    fn test_undeclared_columns_use_first_value() {
        let result_set = ResultSet::new(
            "vw_summary",
            vec![
                ResultColumn::new("total", None),
                ResultColumn::new("ratio", None),
                ResultColumn::new("always_null", None),
            ],
            vec![
                vec![Scalar::Null, Scalar::Float(0.5), Scalar::Null],
                vec![Scalar::Integer(4), Scalar::Float(1.5), Scalar::Null],
            ],
        );

        let schema = infer_schema(&result_set).unwrap();
        let kinds: Vec<_> = schema.fields().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![PortableKind::Integer, PortableKind::Float, PortableKind::Text]
        );
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let result_set = ResultSet::new(
            "joined",
            vec![
                ResultColumn::new("id", Some("INTEGER")),
                ResultColumn::new("id", Some("INTEGER")),
            ],
            vec![vec![Scalar::Integer(1), Scalar::Integer(1)]],
        );

        let error = infer_schema(&result_set).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::EncodingError);
    }

    #[test]
    fn test_into_records_canonicalizes_values() {
        let result_set = ResultSet::new(
            "hired_employees",
            vec![
                ResultColumn::new("id", Some("INTEGER")),
                ResultColumn::new("datetime", Some("TEXT")),
            ],
            vec![vec![Scalar::Integer(1), Scalar::Integer(20210101)]],
        );

        let schema = infer_schema(&result_set).unwrap();
        let records = result_set.into_records(&schema);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("datetime"),
            Some(&Scalar::Text("20210101".into()))
        );
    }
}

//! Conversions between portable types and Avro schemas and values.

use apache_avro::Schema;
use apache_avro::types::Value;
use serde_json::json;

use crate::error::{CoreError, CoreResult};
use crate::identifiers::SqlIdentifier;
use crate::kind::PortableKind;
use crate::record::{Record, Scalar};
use crate::schema::{Field, RecordSchema};

const NULL_BRANCH: u32 = 0;
const VALUE_BRANCH: u32 = 1;

/// Build the writer schema: a flat record whose fields are all `["null", T]`.
pub(crate) fn to_avro_schema(schema: &RecordSchema) -> CoreResult<Schema> {
    check_name(schema.name())?;

    let mut fields = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        check_name(&field.name)?;
        fields.push(json!({
            "name": field.name,
            "type": ["null", field.kind.avro_type()],
        }));
    }

    let document = json!({
        "type": "record",
        "name": schema.name(),
        "fields": fields,
    });

    Schema::parse(&document).map_err(|e| CoreError::encoding(schema.name(), e.to_string()))
}

fn check_name(name: &str) -> CoreResult<()> {
    SqlIdentifier::check(name)
        .map_err(|reason| CoreError::encoding(name, format!("not a valid Avro name: {reason}")))
}

/// Read the embedded writer schema back into a portable schema.
pub(crate) fn from_avro_schema(schema: &Schema, artifact: &str) -> CoreResult<RecordSchema> {
    let Schema::Record(record) = schema else {
        return Err(CoreError::corrupt(
            artifact,
            "embedded schema is not a record",
        ));
    };

    let fields = record
        .fields
        .iter()
        .map(|field| {
            portable_kind(&field.schema)
                .map(|kind| Field::new(field.name.clone(), kind))
                .ok_or_else(|| {
                    CoreError::corrupt(
                        artifact,
                        format!("field '{}' does not have a portable type", field.name),
                    )
                })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    RecordSchema::new(record.name.name.clone(), fields).map_err(|e| CoreError::corrupt(artifact, e))
}

fn portable_kind(schema: &Schema) -> Option<PortableKind> {
    match schema {
        Schema::Long | Schema::Int => Some(PortableKind::Integer),
        Schema::Double | Schema::Float => Some(PortableKind::Float),
        Schema::Boolean => Some(PortableKind::Boolean),
        Schema::String => Some(PortableKind::Text),
        Schema::Union(union) => {
            let mut non_null = union
                .variants()
                .iter()
                .filter(|variant| !matches!(variant, Schema::Null));
            match (non_null.next(), non_null.next()) {
                (Some(variant), None) => portable_kind(variant),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Convert one record into an Avro record value in schema field order.
pub(crate) fn to_avro_value(schema: &RecordSchema, record: &Record) -> CoreResult<Value> {
    if let Some(extra) = record.fields().find(|name| schema.field(name).is_none()) {
        return Err(CoreError::encoding(extra, "field is not part of the schema"));
    }

    let mut fields = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let value = match record.get(&field.name) {
            None | Some(Scalar::Null) => Value::Union(NULL_BRANCH, Box::new(Value::Null)),
            Some(scalar) => Value::Union(
                VALUE_BRANCH,
                Box::new(scalar_to_avro(&field.name, field.kind, scalar)?),
            ),
        };
        fields.push((field.name.clone(), value));
    }

    Ok(Value::Record(fields))
}

fn scalar_to_avro(field: &str, kind: PortableKind, scalar: &Scalar) -> CoreResult<Value> {
    match (kind, scalar) {
        (PortableKind::Integer, Scalar::Integer(i)) => Ok(Value::Long(*i)),
        (PortableKind::Float, Scalar::Float(f)) => Ok(Value::Double(*f)),
        (PortableKind::Float, Scalar::Integer(i)) => Ok(Value::Double(*i as f64)),
        (PortableKind::Boolean, Scalar::Boolean(b)) => Ok(Value::Boolean(*b)),
        (PortableKind::Text, Scalar::Text(s)) => Ok(Value::String(s.clone())),
        (kind, other) => Err(CoreError::encoding(
            field,
            format!("expected {kind}, found {}", other.type_name()),
        )),
    }
}

/// Convert a decoded Avro record value into a record.
pub(crate) fn from_avro_value(
    schema: &RecordSchema,
    value: Value,
    artifact: &str,
) -> CoreResult<Record> {
    let Value::Record(fields) = value else {
        return Err(CoreError::corrupt(artifact, "datum is not a record"));
    };

    fields
        .into_iter()
        .map(|(name, value)| {
            let kind = schema
                .field(&name)
                .map(|f| f.kind)
                .ok_or_else(|| CoreError::corrupt(artifact, format!("unexpected field '{name}'")))?;
            let scalar = avro_to_scalar(value).ok_or_else(|| {
                CoreError::corrupt(artifact, format!("field '{name}' has a non-portable value"))
            })?;
            Ok((name, scalar.canonicalize(kind)))
        })
        .collect()
}

fn avro_to_scalar(value: Value) -> Option<Scalar> {
    match value {
        Value::Null => Some(Scalar::Null),
        Value::Boolean(b) => Some(Scalar::Boolean(b)),
        Value::Int(i) => Some(Scalar::Integer(i64::from(i))),
        Value::Long(i) => Some(Scalar::Integer(i)),
        Value::Float(f) => Some(Scalar::Float(f64::from(f))),
        Value::Double(f) => Some(Scalar::Float(f)),
        Value::String(s) => Some(Scalar::Text(s)),
        Value::Union(_, inner) => avro_to_scalar(*inner),
        _ => None,
    }
}

//! Read queries that materialize whole tables and views.

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tabvault_core::{ResultColumn, ResultSet, Scalar, SqlIdentifier};

use crate::error::{StoreError, StoreResult};

/// Views with a fixed presentation order.
const VIEW_ORDERING: &[(&str, &str)] = &[("vw_HiredNumberOverMean2021", "\"numberHired\" DESC")];

/// `SELECT *` every row of a table or view.
pub fn fetch_all(conn: &Connection, source: &SqlIdentifier) -> StoreResult<ResultSet> {
    let sql = format!("SELECT * FROM {}", source.quoted());
    fetch(conn, source, &sql)
}

/// `SELECT *` a reporting view, applying the view's fixed ordering if it has one.
pub fn fetch_view(conn: &Connection, view: &SqlIdentifier) -> StoreResult<ResultSet> {
    let mut sql = format!("SELECT * FROM {}", view.quoted());
    if let Some((_, ordering)) = VIEW_ORDERING
        .iter()
        .find(|(name, _)| *name == view.as_str())
    {
        sql.push_str(" ORDER BY ");
        sql.push_str(ordering);
    }
    fetch(conn, view, &sql)
}

fn fetch(conn: &Connection, source: &SqlIdentifier, sql: &str) -> StoreResult<ResultSet> {
    let query_error = |e| StoreError::Query {
        target: source.to_string(),
        source: e,
    };

    let mut stmt = conn.prepare(sql).map_err(query_error)?;
    let columns: Vec<ResultColumn> = stmt
        .columns()
        .iter()
        .map(|column| ResultColumn::new(column.name(), column.decl_type()))
        .collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|index| row.get_ref(index).map(scalar_from_ref))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .map_err(query_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(query_error)?;

    tracing::debug!(source = %source, rows = rows.len(), "Fetched result set");
    Ok(ResultSet::new(source.as_str(), columns, rows))
}

fn scalar_from_ref(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(i) => Scalar::Integer(i),
        ValueRef::Real(f) => Scalar::Float(f),
        ValueRef::Text(bytes) => Scalar::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Scalar::Text(bytes.iter().map(|b| format!("{b:02x}")).collect()),
    }
}

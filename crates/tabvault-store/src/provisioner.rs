//! Table provisioning for the fixed catalog.

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::Serialize;
use tabvault_core::TableId;

use crate::error::{StoreError, StoreResult};

/// Outcome of [`ensure_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioned {
    Created,
    AlreadyPresent,
}

impl Provisioned {
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Whether a table of this name exists.
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
}

/// Create the table with its fixed layout when absent. Existing tables are
/// never altered.
///
/// The existence check and the DDL share one IMMEDIATE transaction, so of two
/// concurrent callers on the same database only one sees `Created`.
pub fn ensure_table(conn: &Connection, table: TableId) -> StoreResult<Provisioned> {
    let provision_error = |source| StoreError::Provision {
        table: table.to_string(),
        source,
    };

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(provision_error)?;

    if table_exists(&tx, table.as_str()).map_err(provision_error)? {
        tracing::debug!(table = %table, "Table already present");
        return Ok(Provisioned::AlreadyPresent);
    }

    tx.execute_batch(&table.layout().create_table_sql())
        .map_err(provision_error)?;
    tx.commit().map_err(provision_error)?;

    tracing::info!(table = %table, "Created table");
    Ok(Provisioned::Created)
}

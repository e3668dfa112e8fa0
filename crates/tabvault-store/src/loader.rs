//! All-or-nothing bulk inserts.

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, TransactionBehavior, params_from_iter};
use serde::Serialize;
use tabvault_core::{Batch, ColumnSpec, Record, Scalar, TableId, TableLayout};

use crate::connection::StoreConnection;
use crate::error::{StoreError, StoreResult};

/// What a successful load did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub table: TableId,
    pub rows_inserted: usize,
    pub statements: usize,
}

/// Inserts a whole batch inside one immediate transaction.
///
/// The insert is split into multi-row statements of at most
/// `max_statement_params` bound parameters; every statement runs in the same
/// transaction, so a failure in any of them rolls back all of them.
#[derive(Debug, Clone, Copy)]
pub struct BulkLoader {
    max_statement_params: usize,
}

impl BulkLoader {
    pub fn new(max_statement_params: usize) -> Self {
        Self {
            max_statement_params: max_statement_params.max(1),
        }
    }

    /// Rows that fit into one statement for a layout of `columns` columns.
    pub fn rows_per_statement(&self, columns: usize) -> usize {
        (self.max_statement_params / columns.max(1)).max(1)
    }

    /// Load `batch` and close `conn`, on success and on failure alike.
    ///
    /// Once the batch is committed a failed close is logged, not returned.
    pub fn load(&self, mut conn: StoreConnection, batch: &Batch) -> StoreResult<LoadReport> {
        let outcome = self.insert_all(&mut conn, batch);
        let closed = conn.close();
        settle(outcome, closed)
    }

    fn insert_all(&self, conn: &mut Connection, batch: &Batch) -> StoreResult<LoadReport> {
        let table = batch.table();
        let layout = table.layout();
        let insert_error = |source| StoreError::BatchInsert {
            table: table.to_string(),
            source,
        };

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(insert_error)?;

        let rows_per_statement = self.rows_per_statement(layout.columns.len());
        let mut rows_inserted = 0;
        let mut statements = 0;

        for chunk in batch.records().chunks(rows_per_statement) {
            let sql = insert_sql(&layout, chunk.len());
            let params = chunk
                .iter()
                .flat_map(|record| bind_row(layout.columns, record));

            match tx.execute(&sql, params_from_iter(params)) {
                Ok(inserted) => {
                    rows_inserted += inserted;
                    statements += 1;
                }
                Err(source) => {
                    tracing::warn!(
                        table = %table,
                        statement = statements + 1,
                        error = %source,
                        "Insert failed, rolling back batch"
                    );
                    // Dropping the transaction rolls it back.
                    drop(tx);
                    return Err(insert_error(source));
                }
            }
        }

        tx.commit().map_err(insert_error)?;

        Ok(LoadReport {
            table,
            rows_inserted,
            statements,
        })
    }
}

/// Combine the insert outcome with the close result of its connection.
fn settle(outcome: StoreResult<LoadReport>, closed: StoreResult<()>) -> StoreResult<LoadReport> {
    let report = outcome?;
    if let Err(error) = closed {
        tracing::warn!(
            table = %report.table,
            error = %error,
            "Batch committed but connection did not close cleanly"
        );
    }

    tracing::info!(
        table = %report.table,
        rows = report.rows_inserted,
        statements = report.statements,
        "Committed batch"
    );
    Ok(report)
}

fn bind_row<'a>(
    columns: &'static [ColumnSpec],
    record: &'a Record,
) -> impl Iterator<Item = Bind<'a>> {
    columns
        .iter()
        .map(move |column| Bind(record.get(column.name).unwrap_or(&Scalar::Null)))
}

/// `INSERT INTO "t" ("a", "b") VALUES (?, ?), (?, ?)` for `rows` rows.
fn insert_sql(layout: &TableLayout, rows: usize) -> String {
    let columns = layout
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = format!("({})", vec!["?"; layout.columns.len()].join(", "));
    let values = vec![placeholders.as_str(); rows].join(", ");

    format!(
        "INSERT INTO \"{}\" ({}) VALUES {}",
        layout.table, columns, values
    )
}

/// Binds a scalar as a statement parameter.
struct Bind<'a>(&'a Scalar);

impl ToSql for Bind<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Scalar::Null => ToSqlOutput::Owned(Value::Null),
            Scalar::Boolean(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            Scalar::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Scalar::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Scalar::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::connection::SqliteConnector;
    use crate::credentials::DbCredentials;
    use crate::provisioner::ensure_table;
    use serde_json::json;
    use tabvault_core::ErrorKind;

    struct Fixture {
        _dir: tempfile::TempDir,
        connector: SqliteConnector,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let connector = SqliteConnector::new(StoreConfig::default().with_data_dir(dir.path()));
            let conn = connector.connect(&DbCredentials::local("hr.db")).unwrap();
            ensure_table(&conn, TableId::Jobs).unwrap();
            conn.close().unwrap();
            Self {
                _dir: dir,
                connector,
            }
        }

        fn connect(&self) -> StoreConnection {
            self.connector
                .connect(&DbCredentials::local("hr.db"))
                .unwrap()
        }

        fn job_count(&self) -> i64 {
            self.connect()
                .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))
                .unwrap()
        }
    }

    fn jobs(ids: impl IntoIterator<Item = i64>) -> Batch {
        let entries = ids
            .into_iter()
            .map(|id| json!({"id": id, "job": format!("job {id}")}))
            .collect();
        Batch::from_json(TableId::Jobs, entries).unwrap()
    }

    #[test]
    fn test_insert_sql_shape() {
        let layout = TableId::Jobs.layout();
        assert_eq!(
            insert_sql(&layout, 2),
            r#"INSERT INTO "jobs" ("id", "job") VALUES (?, ?), (?, ?)"#
        );
    }

    #[test]
    fn test_rows_per_statement() {
        let loader = BulkLoader::new(999);
        assert_eq!(loader.rows_per_statement(2), 499);
        assert_eq!(loader.rows_per_statement(5), 199);
        assert_eq!(BulkLoader::new(3).rows_per_statement(5), 1);
    }

    #[test]
    fn test_load_commits_across_statements() {
        let fixture = Fixture::new();
        let loader = BulkLoader::new(4);

        let report = loader.load(fixture.connect(), &jobs(1..=5)).unwrap();
        assert_eq!(
            report,
            LoadReport {
                table: TableId::Jobs,
                rows_inserted: 5,
                statements: 3,
            }
        );
        assert_eq!(fixture.job_count(), 5);
    }

    #[test]
    fn test_failure_in_later_statement_rolls_back_everything() {
        let fixture = Fixture::new();
        let loader = BulkLoader::new(4);
        loader.load(fixture.connect(), &jobs([9])).unwrap();

        // The duplicate lands in the third statement; the first two must not survive.
        let error = loader.load(fixture.connect(), &jobs([1, 2, 3, 4, 9])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BatchInsertError);
        assert_eq!(
            error.sqlite_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
        assert_eq!(fixture.job_count(), 1);
    }

    #[test]
    fn test_missing_table_is_batch_insert_error() {
        let fixture = Fixture::new();
        let batch = Batch::from_json(
            TableId::Departments,
            vec![json!({"id": 1, "department": "Sales"})],
        )
        .unwrap();

        let error = BulkLoader::new(999)
            .load(fixture.connect(), &batch)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BatchInsertError);
        assert!(error.to_string().contains("departments"));
    }

    #[test]
    fn test_close_failure_after_commit_keeps_report() {
        let report = LoadReport {
            table: TableId::Jobs,
            rows_inserted: 2,
            statements: 1,
        };

        let settled = settle(Ok(report.clone()), Err(StoreError::connection("disk I/O error")));
        assert_eq!(settled.unwrap(), report);
    }

    #[test]
    fn test_insert_failure_wins_over_close_failure() {
        let fixture = Fixture::new();
        let batch = Batch::from_json(
            TableId::Departments,
            vec![json!({"id": 1, "department": "Sales"})],
        )
        .unwrap();
        let mut conn = fixture.connect();
        let outcome = BulkLoader::new(999).insert_all(&mut conn, &batch);

        let error = settle(outcome, Err(StoreError::connection("disk I/O error"))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BatchInsertError);
    }

    #[test]
    fn test_bound_rows_follow_layout_order() {
        let batch = Batch::from_json(TableId::Jobs, vec![json!({"job": "Engineer", "id": 7})]).unwrap();
        let binds: Vec<_> = bind_row(TableId::Jobs.layout().columns, batch.records().first()).collect();

        assert_eq!(binds.len(), 2);
        assert_eq!(binds[0].to_sql().unwrap(), ToSqlOutput::Owned(Value::Integer(7)));
        assert_eq!(
            binds[1].to_sql().unwrap(),
            ToSqlOutput::Borrowed(ValueRef::Text(b"Engineer"))
        );
    }
}

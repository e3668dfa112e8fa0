//! Bulk insert atomicity across multi-statement batches

use rstest::rstest;
use rusqlite::Connection;
use serde_json::{Value, json};
use tabvault::{DbCredentials, ErrorKind, StoreConfig, TableVault};

struct Fixture {
    dir: tempfile::TempDir,
    vault: TableVault,
}

impl Fixture {
    fn new(max_statement_params: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        Connection::open(dir.path().join("data/hr.db"))
            .unwrap()
            .execute_batch(
                "CREATE TABLE hired_employees (
                    id INTEGER PRIMARY KEY,
                    name VARCHAR(50) NOT NULL,
                    datetime VARCHAR(50) NOT NULL,
                    department_id INTEGER,
                    job_id INTEGER
                );",
            )
            .unwrap();
        let vault = TableVault::new(
            StoreConfig::default()
                .with_data_dir(dir.path().join("data"))
                .with_max_statement_params(max_statement_params),
        );
        Self { dir, vault }
    }

    fn count(&self) -> i64 {
        Connection::open(self.dir.path().join("data/hr.db"))
            .unwrap()
            .query_row("SELECT COUNT(*) FROM hired_employees", [], |row| row.get(0))
            .unwrap()
    }
}

fn employees(ids: impl IntoIterator<Item = i64>) -> Vec<Value> {
    ids.into_iter()
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Employee {id}"),
                "datetime": "2021-11-07T02:48:42Z",
                "department_id": id % 5,
                "job_id": null,
            })
        })
        .collect()
}

#[rstest]
#[case::one_statement(999)]
#[case::many_statements(10)]
#[case::row_per_statement(5)]
fn batches_commit_whole(#[case] max_statement_params: usize) {
    let fixture = Fixture::new(max_statement_params);

    let report = fixture
        .vault
        .insert_json(&DbCredentials::local("hr.db"), "hired_employees", employees(1..=40))
        .unwrap();

    assert_eq!(report.rows_inserted, 40);
    assert_eq!(fixture.count(), 40);
}

#[rstest]
#[case::one_statement(999)]
#[case::many_statements(10)]
fn violation_in_a_late_statement_rolls_back_earlier_ones(#[case] max_statement_params: usize) {
    let fixture = Fixture::new(max_statement_params);
    let mut entries = employees(1..=40);
    entries.extend(employees([3]));

    let error = fixture
        .vault
        .insert_json(&DbCredentials::local("hr.db"), "hired_employees", entries)
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::BatchInsertError);
    assert_eq!(fixture.count(), 0);
}

#[test]
fn nullable_fields_may_be_omitted() {
    let fixture = Fixture::new(999);

    fixture
        .vault
        .insert_json(
            &DbCredentials::local("hr.db"),
            "hired_employees",
            vec![json!({"id": 1, "name": "Ana", "datetime": "2021-07-27T16:02:08Z"})],
        )
        .unwrap();

    let department: Option<i64> = Connection::open(fixture.dir.path().join("data/hr.db"))
        .unwrap()
        .query_row(
            "SELECT department_id FROM hired_employees WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(department, None);
}

#[test]
fn empty_batches_are_rejected() {
    let fixture = Fixture::new(999);

    let error = fixture
        .vault
        .insert_json(&DbCredentials::local("hr.db"), "hired_employees", Vec::new())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::EmptyBatch);
}

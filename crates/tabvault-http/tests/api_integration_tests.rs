//! End-to-end tests of the HTTP routes over on-disk stores

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use rusqlite::Connection;
use serde_json::{Value, json};
use std::path::PathBuf;
use tabvault_core::TableId;
use tabvault_http::{HttpRuntimeConfigBuilder, HttpVaultRuntime};
use tower::ServiceExt;

struct Server {
    dir: tempfile::TempDir,
    router: Router,
}

impl Server {
    fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = HttpRuntimeConfigBuilder::new()
            .backup_dir(dir.path().join("backups"))
            .data_dir(dir.path().join("data"))
            .build()
            .unwrap();
        let router = HttpVaultRuntime::from_config(&config).router_with_config(&config);
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        Self { dir, router }
    }

    fn database(&self, name: &str) -> Connection {
        Connection::open(self.dir.path().join("data").join(name)).unwrap()
    }

    fn backups(&self) -> PathBuf {
        self.dir.path().join("backups")
    }

    async fn call(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn creds(database: &str) -> Value {
    json!({"server": "localhost", "database": database})
}

#[tokio::test]
async fn backup_then_restore_into_a_fresh_database() {
    let server = Server::start();
    server
        .database("source.db")
        .execute_batch(&TableId::Jobs.layout().create_table_sql())
        .unwrap();

    let (status, _) = server
        .call(
            "POST",
            "/insert/jobs",
            json!({
                "entries": [{"id": 1, "job": "Engineer"}, {"id": 2, "job": "Analyst"}],
                "db_credentials": creds("source.db"),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .call("GET", "/backup/jobs", json!({"db_credentials": creds("source.db")}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Backup completed");
    assert_eq!(body["records"], 2);
    assert!(server.backups().join("jobs_backup.avro").is_file());

    let (status, body) = server
        .call(
            "POST",
            "/restore",
            json!({"db_credentials": creds("target.db"), "file_name": "jobs_backup.avro"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Restore successful");
    assert_eq!(body["table"], "jobs");
    assert_eq!(body["rows_loaded"], 2);
    assert_eq!(body["table_created"], true);

    let (status, body) = server
        .call(
            "POST",
            "/report/query_view",
            json!({"view_name": "jobs", "db_credentials": creds("target.db")}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([{"id": 1, "job": "Engineer"}, {"id": 2, "job": "Analyst"}])
    );
}

#[tokio::test]
async fn backup_of_an_empty_table_is_not_found() {
    let server = Server::start();
    server
        .database("hr.db")
        .execute_batch(&TableId::Departments.layout().create_table_sql())
        .unwrap();

    let (status, body) = server
        .call("GET", "/backup/departments", json!({"db_credentials": creds("hr.db")}))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "empty_result");
    assert!(!server.backups().join("departments_backup.avro").exists());
}

#[tokio::test]
async fn backup_of_a_malformed_name_is_bad_request() {
    let server = Server::start();

    let (status, body) = server
        .call("GET", "/backup/jobs%3Bdrop", json!({"db_credentials": creds("hr.db")}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_identifier");
}

#[tokio::test]
async fn hiring_report_is_ordered_by_hires() {
    let server = Server::start();
    server
        .database("hr.db")
        .execute_batch(
            "CREATE TABLE hires (department TEXT, numberHired INTEGER);
             INSERT INTO hires VALUES ('Sales', 3), ('Eng', 12), ('HR', 7);
             CREATE VIEW vw_HiredNumberOverMean2021 AS SELECT department, numberHired FROM hires;",
        )
        .unwrap();

    let (status, body) = server
        .call(
            "POST",
            "/report/query_view",
            json!({"view_name": "vw_HiredNumberOverMean2021", "db_credentials": creds("hr.db")}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let hires: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["numberHired"].as_i64().unwrap())
        .collect();
    assert_eq!(hires, vec![12, 7, 3]);
}

#[tokio::test]
async fn missing_view_is_bad_request() {
    let server = Server::start();

    let (status, body) = server
        .call(
            "POST",
            "/report/query_view",
            json!({"view_name": "vw_missing", "db_credentials": creds("hr.db")}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "query_error");
}

#[tokio::test]
async fn restore_of_a_foreign_artifact_name_fails() {
    let server = Server::start();
    std::fs::create_dir_all(server.backups()).unwrap();
    std::fs::write(server.backups().join("jobs.avro"), b"not an artifact").unwrap();

    let (status, body) = server
        .call(
            "POST",
            "/restore",
            json!({"db_credentials": creds("hr.db"), "file_name": "jobs.avro"}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "invalid_artifact_name");
}

use serde::Deserialize;
use serde_json::Value;
use tabvault_store::DbCredentials;

/// Body of `POST /insert/{table}`.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertRequest {
    /// Raw records; validated against the table layout before any write.
    pub entries: Vec<Value>,
    pub db_credentials: DbCredentials,
}

/// Body of `GET /backup/{table}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupRequest {
    pub db_credentials: DbCredentials,
}

/// Body of `POST /restore`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestoreRequest {
    pub db_credentials: DbCredentials,
    /// Artifact in the backup directory. The newest artifact when absent.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Body of `POST /report/query_view`.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewQuery {
    pub view_name: String,
    pub db_credentials: DbCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_restore_file_name_is_optional() {
        let request: RestoreRequest = serde_json::from_value(json!({
            "db_credentials": {"server": "localhost", "database": "hr.db"}
        }))
        .unwrap();
        assert_eq!(request.file_name, None);
        assert_eq!(request.db_credentials.uid, "");
    }

    #[test]
    fn test_insert_request_keeps_raw_entries() {
        let request: InsertRequest = serde_json::from_value(json!({
            "entries": [{"id": 1, "job": "Engineer", "extra": true}],
            "db_credentials": {"server": "localhost", "database": "hr.db", "uid": "sa", "pwd": "x"}
        }))
        .unwrap();
        assert_eq!(request.entries[0]["extra"], json!(true));
        assert!(!format!("{request:?}").contains("\"x\""));
    }
}

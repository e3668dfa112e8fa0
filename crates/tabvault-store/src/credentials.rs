//! Per-request store credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server names that address the embedded engine on this host.
pub const LOCAL_SERVERS: &[&str] = &["localhost", "127.0.0.1", "::1", ".", "local"];

/// Connection details supplied with every store-facing operation.
///
/// Never persisted. The password is skipped on serialization and redacted in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCredentials {
    pub server: String,
    pub database: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing)]
    pub pwd: String,
}

impl DbCredentials {
    /// Credentials for a local database file with no login.
    pub fn local(database: impl Into<String>) -> Self {
        Self {
            server: "localhost".to_string(),
            database: database.into(),
            uid: String::new(),
            pwd: String::new(),
        }
    }

    pub fn with_login(mut self, uid: impl Into<String>, pwd: impl Into<String>) -> Self {
        self.uid = uid.into();
        self.pwd = pwd.into();
        self
    }

    pub fn is_local_server(&self) -> bool {
        let server = self.server.trim();
        LOCAL_SERVERS
            .iter()
            .any(|local| server.eq_ignore_ascii_case(local))
    }
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("uid", &self.uid)
            .field("pwd", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted() {
        let creds = DbCredentials::local("hr.db").with_login("admin", "hunter2");

        let debug = format!("{creds:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));

        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("pwd"));
    }

    #[test]
    fn test_login_fields_are_optional() {
        let creds: DbCredentials =
            serde_json::from_str(r#"{"server": "localhost", "database": "hr.db"}"#).unwrap();
        assert!(creds.uid.is_empty());
        assert!(creds.pwd.is_empty());
    }

    #[test]
    fn test_local_server_names() {
        for server in ["localhost", "LOCALHOST", "127.0.0.1", "::1", ".", " local "] {
            let mut creds = DbCredentials::local("hr.db");
            creds.server = server.to_string();
            assert!(creds.is_local_server(), "{server} should be local");
        }

        let mut creds = DbCredentials::local("hr.db");
        creds.server = "db.example.com".to_string();
        assert!(!creds.is_local_server());
    }
}

//! Opening per-operation SQLite connections from request credentials.

use rusqlite::{Connection, OpenFlags};
use std::ops::{Deref, DerefMut};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::StoreConfig;
use crate::credentials::DbCredentials;
use crate::error::{StoreError, StoreResult};

const DATABASE_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

/// Opens one connection per operation. There is no pool: a connection lives
/// exactly as long as the operation that opened it.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    config: StoreConfig,
}

impl SqliteConnector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Check credentials and open the addressed database.
    pub fn connect(&self, credentials: &DbCredentials) -> StoreResult<StoreConnection> {
        if !credentials.is_local_server() {
            return Err(StoreError::connection(format!(
                "server '{}' is not reachable: only local servers are supported",
                credentials.server
            )));
        }

        if let Some(login) = &self.config.required_login {
            if credentials.uid != login.uid || credentials.pwd != login.pwd {
                tracing::warn!(uid = %credentials.uid, "Rejected store login");
                return Err(StoreError::connection(format!(
                    "login failed for user '{}'",
                    credentials.uid
                )));
            }
        }

        let path = self.resolve_database_path(&credentials.database)?;
        let conn = self.open(&path)?;

        tracing::debug!(database = %path.display(), "Opened store connection");
        Ok(StoreConnection {
            conn,
            database: path,
        })
    }

    /// Resolve a database name to a file path.
    ///
    /// With a data directory configured, only bare file names are accepted and
    /// they resolve inside it.
    pub fn resolve_database_path(&self, database: &str) -> StoreResult<PathBuf> {
        let database = database.trim();
        if database.is_empty() {
            return Err(StoreError::connection("database name cannot be empty"));
        }

        let path = Path::new(database);
        let extension_ok = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DATABASE_EXTENSIONS.contains(&ext));
        if !extension_ok {
            return Err(StoreError::connection(format!(
                "invalid database '{database}': only .db, .sqlite and .sqlite3 files are allowed"
            )));
        }

        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(StoreError::connection(format!(
                "invalid database '{database}': path traversal detected"
            )));
        }

        match &self.config.data_dir {
            Some(data_dir) => {
                let is_bare_name = path.components().count() == 1
                    && matches!(path.components().next(), Some(Component::Normal(_)));
                if !is_bare_name {
                    return Err(StoreError::connection(format!(
                        "invalid database '{database}': expected a file name inside the data directory"
                    )));
                }
                Ok(data_dir.join(path))
            }
            None => Ok(path.to_path_buf()),
        }
    }

    fn open(&self, path: &Path) -> StoreResult<Connection> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        if self.config.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::connection(format!(
                        "cannot create directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        } else if !path.exists() {
            return Err(StoreError::connection(format!(
                "database {} does not exist",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            StoreError::connection(format!("cannot open database {}: {e}", path.display()))
        })?;

        configure(&conn, self.config.busy_timeout_ms).map_err(|e| {
            StoreError::connection(format!("failed to configure SQLite: {e}"))
        })?;

        Ok(conn)
    }
}

fn configure(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

/// A connection owned by a single operation.
#[derive(Debug)]
pub struct StoreConnection {
    conn: Connection,
    database: PathBuf,
}

impl StoreConnection {
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Close the connection, surfacing any error from the engine.
    pub fn close(self) -> StoreResult<()> {
        let database = self.database;
        self.conn.close().map_err(|(_, e)| {
            StoreError::connection(format!(
                "failed to close database {}: {e}",
                database.display()
            ))
        })?;
        tracing::debug!(database = %database.display(), "Closed store connection");
        Ok(())
    }
}

impl Deref for StoreConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for StoreConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabvault_core::ErrorKind;

    fn connector(dir: &Path) -> SqliteConnector {
        SqliteConnector::new(StoreConfig::default().with_data_dir(dir))
    }

    #[test]
    fn test_connect_creates_database_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connector(dir.path())
            .connect(&DbCredentials::local("hr.db"))
            .unwrap();

        assert_eq!(conn.database(), dir.path().join("hr.db"));
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
        assert_eq!(one, 1);
        conn.close().unwrap();
        assert!(dir.path().join("hr.db").exists());
    }

    #[test]
    fn test_remote_server_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let mut creds = DbCredentials::local("hr.db");
        creds.server = "sql.example.com".into();

        let error = connector(dir.path()).connect(&creds).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ConnectionError);
        assert!(error.to_string().contains("sql.example.com"));
    }

    #[test]
    fn test_required_login_is_enforced_without_leaking_password() {
        let dir = tempfile::tempdir().unwrap();
        let connector = SqliteConnector::new(
            StoreConfig::default()
                .with_data_dir(dir.path())
                .with_required_login("etl", "s3cret"),
        );

        let bad = DbCredentials::local("hr.db").with_login("etl", "wrong-password");
        let error = connector.connect(&bad).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ConnectionError);
        assert!(!error.to_string().contains("wrong-password"));

        let good = DbCredentials::local("hr.db").with_login("etl", "s3cret");
        assert!(connector.connect(&good).is_ok());
    }

    #[test]
    fn test_database_names_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let connector = connector(dir.path());

        for database in ["", "hr.txt", "hr", "../hr.db", "nested/hr.db"] {
            let error = connector.resolve_database_path(database).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::ConnectionError, "{database}");
        }
    }

    #[test]
    fn test_missing_database_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig::default().with_data_dir(dir.path());
        config.create_if_missing = false;

        let error = SqliteConnector::new(config)
            .connect(&DbCredentials::local("absent.db"))
            .unwrap_err();
        assert!(error.to_string().contains("does not exist"));
        assert!(!dir.path().join("absent.db").exists());
    }
}

//! Store configuration.

use std::path::PathBuf;

/// Default bound on rows per direct-insert batch.
pub const DEFAULT_MAX_BATCH_ROWS: usize = 10_000;
/// SQLite's historical host-parameter limit.
pub const DEFAULT_MAX_STATEMENT_PARAMS: usize = 999;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// A login the store requires from every caller.
#[derive(Clone, PartialEq, Eq)]
pub struct RequiredLogin {
    pub uid: String,
    pub pwd: String,
}

impl std::fmt::Debug for RequiredLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequiredLogin")
            .field("uid", &self.uid)
            .field("pwd", &"[REDACTED]")
            .finish()
    }
}

/// How the store resolves, opens and writes to databases.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory that relative database names resolve inside.
    pub data_dir: Option<PathBuf>,
    /// Create missing database files instead of reporting them unreachable.
    pub create_if_missing: bool,
    pub busy_timeout_ms: u64,
    pub max_batch_rows: usize,
    pub max_statement_params: usize,
    pub required_login: Option<RequiredLogin>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            create_if_missing: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_batch_rows: DEFAULT_MAX_BATCH_ROWS,
            max_statement_params: DEFAULT_MAX_STATEMENT_PARAMS,
            required_login: None,
        }
    }
}

impl StoreConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_required_login(mut self, uid: impl Into<String>, pwd: impl Into<String>) -> Self {
        self.required_login = Some(RequiredLogin {
            uid: uid.into(),
            pwd: pwd.into(),
        });
        self
    }

    pub fn with_max_batch_rows(mut self, rows: usize) -> Self {
        self.max_batch_rows = rows;
        self
    }

    pub fn with_max_statement_params(mut self, params: usize) -> Self {
        self.max_statement_params = params;
        self
    }
}

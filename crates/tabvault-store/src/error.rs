//! Store-level errors.

use tabvault_core::{CoreError, ErrorKind};

/// Failures raised while talking to the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("cannot connect to store: {reason}")]
    Connection { reason: String },

    #[error("cannot provision table {table}: {source}")]
    Provision {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("batch insert into {table} failed and was rolled back: {source}")]
    BatchInsert {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query on {target} failed: {source}")]
    Query {
        target: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) => e.kind(),
            Self::Connection { .. } => ErrorKind::ConnectionError,
            Self::Provision { .. } => ErrorKind::ProvisionError,
            Self::BatchInsert { .. } => ErrorKind::BatchInsertError,
            Self::Query { .. } => ErrorKind::QueryError,
        }
    }

    pub(crate) fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// SQLite extended result code, when the cause is an engine failure.
    pub fn sqlite_code(&self) -> Option<rusqlite::ErrorCode> {
        let source = match self {
            Self::Provision { source, .. }
            | Self::BatchInsert { source, .. }
            | Self::Query { source, .. } => source,
            _ => return None,
        };
        source.sqlite_error_code()
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_kind() {
        let error: StoreError = CoreError::UnknownTable {
            table: "widgets".into(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::UnknownTable);
        assert_eq!(
            error.to_string(),
            "unknown table 'widgets': expected one of hired_employees, departments, jobs"
        );
    }

    #[test]
    fn test_store_error_kinds() {
        assert_eq!(
            StoreError::connection("login rejected").kind(),
            ErrorKind::ConnectionError
        );
        let error = StoreError::BatchInsert {
            table: "jobs".into(),
            source: rusqlite::Error::QueryReturnedNoRows,
        };
        assert_eq!(error.kind(), ErrorKind::BatchInsertError);
        assert!(error.sqlite_code().is_none());
    }
}

use std::path::PathBuf;
use tabvault_core::ErrorKind;
use tabvault_http::ConfigError;
use tabvault_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("records file {path} is not valid: {reason}")]
    RecordsFile { path: PathBuf, reason: String },

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::RecordsFile { .. } => ErrorKind::InvalidRecord,
            Self::Read { .. } | Self::Config(_) | Self::Serve(_) => ErrorKind::InternalError,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

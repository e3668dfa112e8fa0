//! Subcommand implementations.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tabvault_core::{CoreError, artifact_file_name};
use tabvault_http::{HttpRuntimeConfigBuilder, HttpVaultRuntime};
use tabvault_store::{StoreConfig, StoreError, TableVault};

use crate::StoreArgs;
use crate::error::{CliError, CliResult};

pub fn run_serve(
    bind: Option<SocketAddr>,
    backup_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> CliResult<()> {
    let mut builder = HttpRuntimeConfigBuilder::from_env()?;
    if let Some(addr) = bind {
        builder = builder.bind_addr(addr);
    }
    if let Some(dir) = backup_dir {
        builder = builder.backup_dir(dir);
    }
    if let Some(dir) = data_dir {
        builder = builder.data_dir(dir);
    }
    let config = builder.build()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Serve)?;

    runtime
        .block_on(HttpVaultRuntime::from_config(&config).serve(config))
        .map_err(CliError::Serve)
}

pub fn run_backup(store: &StoreArgs, table: &str, out_dir: &Path) -> CliResult<()> {
    fs::create_dir_all(out_dir).map_err(|source| {
        StoreError::from(CoreError::Write {
            path: out_dir.display().to_string(),
            source,
        })
    })?;

    let path = out_dir.join(artifact_file_name(table));
    let report = vault(store).backup_to(&store.credentials(), table, &path)?;
    print_report(&report);
    Ok(())
}

pub fn run_restore(store: &StoreArgs, file: &Path) -> CliResult<()> {
    let report = vault(store).restore_from(&store.credentials(), file)?;
    print_report(&report);
    Ok(())
}

pub fn run_insert(store: &StoreArgs, table: &str, file: &Path) -> CliResult<()> {
    let entries = read_entries(file)?;
    let report = vault(store).insert_json(&store.credentials(), table, entries)?;
    print_report(&report);
    Ok(())
}

fn vault(store: &StoreArgs) -> TableVault {
    let config = match &store.data_dir {
        Some(dir) => StoreConfig::default().with_data_dir(dir),
        None => StoreConfig::default(),
    };
    TableVault::new(config)
}

/// Records from a JSON array, or from the `entries` array of an insert body.
fn read_entries(file: &Path) -> CliResult<Vec<Value>> {
    let invalid = |reason: String| CliError::RecordsFile {
        path: file.to_path_buf(),
        reason,
    };

    let raw = fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let document: Value = serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;

    match document {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut body) => match body.remove("entries") {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Err(invalid("expected an `entries` array".to_string())),
        },
        _ => Err(invalid("expected an array of records".to_string())),
    }
}

fn print_report<T: Serialize>(report: &T) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "Could not render report"),
    }
}

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

mod commands;
mod error;
mod logging;

use commands::{run_backup, run_insert, run_restore, run_serve};
use logging::{LogFormat, init_tracing};
use tabvault_store::DbCredentials;

#[derive(Parser, Debug)]
#[command(name = "tabvault", version)]
#[command(about = "Tabvault CLI - Avro table backups and transactional bulk loads")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides TABVAULT_BIND_ADDR)
        #[arg(long)]
        bind: Option<SocketAddr>,
        /// Backup artifact directory (overrides TABVAULT_BACKUP_DIR)
        #[arg(long)]
        backup_dir: Option<PathBuf>,
        /// Database directory (overrides TABVAULT_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Back up a table to `<out-dir>/<table>_backup.avro`
    Backup {
        #[arg(long)]
        table: String,
        #[arg(long, default_value = "backups")]
        out_dir: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Restore an artifact into its table, creating the table if needed
    Restore {
        /// Artifact path; the file name selects the table
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Insert records from a JSON file in one transaction
    Insert {
        #[arg(long)]
        table: String,
        /// JSON array of records, or an object with an `entries` array
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
}

/// Connection options shared by the store commands.
#[derive(Args, Debug, Clone)]
struct StoreArgs {
    #[arg(long)]
    database: String,
    #[arg(long, default_value = "localhost")]
    server: String,
    #[arg(long, default_value = "")]
    uid: String,
    #[arg(long, env = "TABVAULT_DB_PWD", default_value = "", hide_env_values = true)]
    pwd: String,
    /// Directory the database name resolves inside
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl StoreArgs {
    fn credentials(&self) -> DbCredentials {
        DbCredentials {
            server: self.server.clone(),
            database: self.database.clone(),
            uid: self.uid.clone(),
            pwd: self.pwd.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let outcome = match cli.command {
        Commands::Serve {
            bind,
            backup_dir,
            data_dir,
        } => run_serve(bind, backup_dir, data_dir),
        Commands::Backup {
            table,
            out_dir,
            store,
        } => run_backup(&store, &table, &out_dir),
        Commands::Restore { file, store } => run_restore(&store, &file),
        Commands::Insert { table, file, store } => run_insert(&store, &table, &file),
    };

    if let Err(e) = outcome {
        tracing::error!(kind = %e.kind(), error = %e, "Command failed");
        std::process::exit(1);
    }
}

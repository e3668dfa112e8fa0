use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// A subscriber that cannot be installed is reported on stderr.
pub fn init_tracing(format: LogFormat) {
    if let Err(error) = install(format) {
        eprintln!("tabvault: could not install log subscriber: {error}");
    }
}

fn install(format: LogFormat) -> Result<(), InitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
}

//! Tracing setup for the binary.
//!
//! `POZOLE_LOG` takes precedence over the level passed on the command line
//! and accepts any `EnvFilter` directive, e.g. `pozole::engine=debug`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "POZOLE_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

pub fn init_tracing(log_level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter = EnvFilter::try_new(&filter)
        .map_err(|err| anyhow::anyhow!("invalid log filter '{filter}': {err}"))?;

    //logs go to stderr so csv or table output on stdout stays clean
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_target(false).init(),
    }

    Ok(())
}

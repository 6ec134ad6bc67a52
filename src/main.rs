//! Date Sorter - copies files into a year/month/day tree
//!
//! Thin binary around the library: parses arguments, loads the optional
//! config file, sets up logging and runs the sort.

use anyhow::Result;
use clap::Parser;
use date_sorter::{Cli, Config, SortSummary, Sorter};
use std::path::Path;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    let guard = setup_logging(&config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        source = %config.source_dir.display(),
        dest = %config.dest_dir.display(),
        others = %config.other_dir.display(),
        "Date Sorter starting"
    );

    Ok(finish(Sorter::new(config).run(), guard))
}

/// Map the run outcome to an exit code, flushing the log file first
fn finish(outcome: date_sorter::Result<SortSummary>, guard: Option<WorkerGuard>) -> ExitCode {
    let code = match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Sorting failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    };
    drop(guard);
    code
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => cli.merge_with_config(Config::load_from_file(path)?),
        None => cli.to_config(),
    };
    Ok(config)
}

/// Setup logging to stderr, plus the optional log file
fn setup_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(ref log_path) = config.log_file else {
        subscriber.init();
        return Ok(None);
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(open_log_file(log_path)?);

    if config.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}

fn open_log_file(log_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_finish_flushes_fatal_line_to_log_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("logs/run.log");
        let (writer, guard) = tracing_appender::non_blocking(open_log_file(&log_path).unwrap());
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(writer));

        let code = tracing::subscriber::with_default(subscriber, || {
            info!("Reading files");
            let outcome = Err(date_sorter::Error::NotRegularFile {
                path: PathBuf::from("/nowhere"),
            });
            finish(outcome, Some(guard))
        });

        assert_eq!(code, ExitCode::FAILURE);
        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("Reading files"));
        assert!(log.contains("Sorting failed"));
    }

    #[test]
    fn test_finish_success() {
        assert_eq!(finish(Ok(SortSummary::default()), None), ExitCode::SUCCESS);
    }
}

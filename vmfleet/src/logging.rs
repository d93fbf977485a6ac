//! Process-wide logging setup.

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use vmfleet_shared::constants::logging::{FILE_PREFIX, FILTER_ENV};
use vmfleet_shared::{FleetError, FleetResult};

use crate::options::LoggingOptions;

/// Holds the writer guard once installed. Held locked for the whole
/// install so concurrent callers wait instead of racing.
static GUARD: Mutex<Option<WorkerGuard>> = parking_lot::const_mutex(None);

/// Install the global `tracing` subscriber.
///
/// Writes to a daily rolling file under `log_dir` when set, stderr
/// otherwise. `RUST_LOG` overrides `level`. Only the first call does
/// anything.
pub fn init_logging(options: &LoggingOptions) -> FleetResult<()> {
    let mut slot = GUARD.lock();
    if slot.is_some() {
        return Ok(());
    }

    let filter = build_env_filter(&options.level)?;

    let (writer, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, FILE_PREFIX))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_target(true)
        .with_ansi(options.log_dir.is_none())
        .with_writer(writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| FleetError::Config(format!("failed to install logger: {e}")))?;

    *slot = Some(guard);
    Ok(())
}

fn build_env_filter(level: &str) -> FleetResult<EnvFilter> {
    if let Ok(directives) = std::env::var(FILTER_ENV) {
        if !directives.trim().is_empty() {
            return Ok(EnvFilter::new(directives));
        }
    }
    EnvFilter::try_new(level)
        .map_err(|e| FleetError::Config(format!("invalid log level {level:?}: {e}")))
}

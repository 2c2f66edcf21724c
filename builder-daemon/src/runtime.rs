use std::sync::Arc;

use tokio::sync::broadcast;

use builder_cleaner::{NamespaceSource, RepoLock};
use builder_core::CleanerConfig;

use crate::cleaner::{self, CleanerSettings};
use crate::error::{io_err, DaemonError};

/// Set to `json` for one JSON object per log line.
pub const LOG_FORMAT_ENV: &str = "BUILDER_LOG_FORMAT";

/// Start the cleaner runtime and block the current thread until it exits.
pub fn start_blocking(
    config: CleanerConfig,
    source: Arc<dyn NamespaceSource>,
    lock: RepoLock,
) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config, source, lock))
}

/// Run the cleaner until ctrl-c or until the cleaner task exits.
///
/// `lock` is the process-wide repository lock; hosts pass the same handle to
/// every other subsystem that mutates the git home.
pub async fn run(
    config: CleanerConfig,
    source: Arc<dyn NamespaceSource>,
    lock: RepoLock,
) -> Result<(), DaemonError> {
    config.validate()?;

    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let cleaner = cleaner::spawn_with_shutdown(
        CleanerSettings::from(&config),
        source,
        lock,
        shutdown_tx.clone(),
    );

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down cleaner");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => {
                            let _ = shutdown.send(());
                            Err(DaemonError::Task(format!("ctrl-c handler failed: {err}")))
                        }
                    }
                }
            }
        })
    };

    let (cleaner_result, signal_result) = tokio::join!(cleaner.wait(), signal_handle);

    cleaner_result?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task(format!("{task} task join failure: {err}"))),
    }
}

/// Install the global stderr tracing subscriber (`RUST_LOG`, default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        let _ = fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

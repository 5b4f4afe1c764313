use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use vbasync_core::HostConnector;

use crate::dispatcher::{DispatchSummary, Dispatcher};
use crate::error::{io_err, WatchError};
use crate::event::FileEvent;
use crate::paths::EVENT_QUEUE_CAPACITY;
use crate::watcher::watch_tree;

/// What to watch and where to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub document: PathBuf,
    pub source_dir: PathBuf,
}

/// Start the watcher and block the current thread until it is stopped with
/// ctrl-c.
pub fn start_blocking<C>(connector: C, config: WatchConfig) -> Result<DispatchSummary, WatchError>
where
    C: HostConnector + 'static,
{
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(Arc::new(connector), config))
}

/// Run until ctrl-c.
pub async fn run<C>(connector: Arc<C>, config: WatchConfig) -> Result<DispatchSummary, WatchError>
where
    C: HostConnector + 'static,
{
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("received ctrl-c, finishing the current event");
                    let _ = shutdown.send(());
                }
                Err(err) => tracing::error!(error = %err, "ctrl-c handler failed"),
            }
        })
    };

    let result = run_with_shutdown(connector, config, shutdown_tx).await;
    signal_handle.abort();
    result
}

/// Run until `shutdown` fires. The host is probed once up front so an
/// unreachable document fails fast instead of on the first event.
pub async fn run_with_shutdown<C>(
    connector: Arc<C>,
    config: WatchConfig,
    shutdown: broadcast::Sender<()>,
) -> Result<DispatchSummary, WatchError>
where
    C: HostConnector + 'static,
{
    // Subscribe before any await so a signal sent during startup is seen.
    let shutdown_rx = shutdown.subscribe();

    let probe = {
        let connector = Arc::clone(&connector);
        let document = config.document.clone();
        tokio::task::spawn_blocking(move || {
            connector.connect(&document).map(|session| {
                session.abandon();
            })
        })
    };
    probe.await??;

    let source_dir = &config.source_dir;
    if !source_dir.exists() {
        fs::create_dir_all(source_dir).map_err(|e| io_err(source_dir, e))?;
    }
    let root = fs::canonicalize(source_dir).map_err(|e| io_err(source_dir, e))?;

    let (event_tx, event_rx) = mpsc::channel::<FileEvent>(EVENT_QUEUE_CAPACITY);
    let watcher = watch_tree(&root, event_tx)?;
    tracing::info!(
        document = %config.document.display(),
        source = %root.display(),
        "watch started"
    );

    let dispatcher = Dispatcher::new(connector, config.document);
    let summary = dispatcher.run(event_rx, shutdown_rx).await;
    drop(watcher);
    Ok(summary)
}

/// Install the stderr subscriber. `RUST_LOG` overrides the default `info`
/// filter; `log` records from the library crates are forwarded.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;
    use vbasync_core::memory::{MemoryConnector, MemoryHost};
    use vbasync_core::{ArtifactHost, ArtifactName, Ownership};

    use super::*;

    #[tokio::test]
    async fn unreachable_document_fails_before_watching() {
        let tmp = TempDir::new().expect("tmp");
        let mut host = MemoryHost::with_project(vec![]);
        let connector = Arc::new(MemoryConnector::new(host.clone(), Ownership::SelfOpened));
        host.disconnect_after(0);
        let _ = host.remove_artifact(&ArtifactName::from("x"));

        let (shutdown, _) = broadcast::channel(1);
        let source_dir = tmp.path().join("vba_src");
        let err = run_with_shutdown(
            connector,
            WatchConfig {
                document: PathBuf::from("Book1.xlsm"),
                source_dir: source_dir.clone(),
            },
            shutdown,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WatchError::Host(_)), "got: {err}");
        assert!(!Path::new(&source_dir).exists());
    }

    #[tokio::test]
    async fn creates_missing_source_dir_and_stops_on_signal() {
        let tmp = TempDir::new().expect("tmp");
        let connector = Arc::new(MemoryConnector::new(
            MemoryHost::with_project(vec![]),
            Ownership::External,
        ));
        let source_dir = tmp.path().join("vba_src");

        let (shutdown, _) = broadcast::channel(1);
        let handle = tokio::spawn(run_with_shutdown(
            connector,
            WatchConfig {
                document: PathBuf::from("Book1.xlsm"),
                source_dir: source_dir.clone(),
            },
            shutdown.clone(),
        ));
        while !source_dir.exists() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        // The dispatcher may not have subscribed yet; resend until it stops.
        let summary = loop {
            let _ = shutdown.send(());
            if handle.is_finished() {
                break handle.await.expect("join").expect("run");
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        };
        assert_eq!(summary, DispatchSummary::default());
    }
}

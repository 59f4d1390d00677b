use anyhow::{anyhow, Result};
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::pricing::Catalog;

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections, clean up)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Catalog reload
#[cfg(unix)]
pub fn setup_signal_handlers(
    catalog: Arc<ArcSwap<Catalog>>,
    catalog_path: PathBuf,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading pricing catalog");
                    let reload = reload_catalog_in_background(catalog.clone(), catalog_path.clone());
                    if let Err(e) = reload.await {
                        error!("Failed to reload catalog, keeping previous one: {}", e);
                    }
                }
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Non-unix platforms: only Ctrl+C is supported, no reload
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _catalog: Arc<ArcSwap<Catalog>>,
    _catalog_path: PathBuf,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, initiating shutdown");
                let _ = tx_clone.send(ShutdownSignal::Graceful);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Load and validate the catalog, then swap it in atomically.
/// On any error the catalog in effect is left untouched.
pub fn reload_catalog(catalog: &ArcSwap<Catalog>, path: &Path) -> Result<()> {
    let new_catalog = Catalog::load(path)?;

    info!(
        tenants = new_catalog.tenant_ids().len(),
        vehicles = new_catalog.vehicle_count(),
        "Catalog reloaded"
    );

    catalog.store(Arc::new(new_catalog));
    Ok(())
}

/// [`reload_catalog`] on the blocking pool, keeping file IO off the runtime workers
pub async fn reload_catalog_in_background(
    catalog: Arc<ArcSwap<Catalog>>,
    path: PathBuf,
) -> Result<()> {
    tokio::task::spawn_blocking(move || reload_catalog(&catalog, &path))
        .await
        .map_err(|e| anyhow!("Catalog reload task failed: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::GlobalModifiers;
    use std::io::Write;

    #[tokio::test]
    async fn test_setup_signal_handlers() {
        let catalog = Arc::new(ArcSwap::from_pointee(Catalog::default()));
        let (shutdown_tx, _handle) =
            setup_signal_handlers(catalog, PathBuf::from("catalog.toml")).unwrap();

        let mut rx = shutdown_tx.subscribe();
        shutdown_tx.send(ShutdownSignal::Graceful).unwrap();

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, ShutdownSignal::Graceful));
    }

    #[test]
    fn test_reload_swaps_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[global]\n\n[[tenants]]\nid = \"acme\"\n").unwrap();

        let catalog = ArcSwap::from_pointee(Catalog::new(GlobalModifiers::default()));
        assert!(catalog.load().tenant("acme").is_none());

        reload_catalog(&catalog, file.path()).unwrap();
        assert!(catalog.load().tenant("acme").is_some());
    }

    #[tokio::test]
    async fn test_background_reload_swaps_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[global]\n\n[[tenants]]\nid = \"coastline\"\n").unwrap();

        let catalog = Arc::new(ArcSwap::from_pointee(Catalog::new(GlobalModifiers::default())));
        reload_catalog_in_background(catalog.clone(), file.path().to_path_buf())
            .await
            .unwrap();
        assert!(catalog.load().tenant("coastline").is_some());

        let missing =
            reload_catalog_in_background(catalog.clone(), PathBuf::from("/nonexistent/catalog.toml"))
                .await;
        assert!(missing.is_err());
        assert!(catalog.load().tenant("coastline").is_some());
    }

    #[test]
    fn test_failed_reload_keeps_previous_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not = [valid").unwrap();

        let catalog = ArcSwap::from_pointee(
            Catalog::new(GlobalModifiers::default()).with_tenant(crate::pricing::Tenant::new("acme"), None),
        );
        assert!(reload_catalog(&catalog, file.path()).is_err());
        assert!(catalog.load().tenant("acme").is_some());
    }
}

//! lanshared — lanshare peer-to-peer file search daemon.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;

use lanshare_core::config::LanshareConfig;
use lanshare_services::{command_channel, DirCatalog, LocalCatalog};

use lanshared::{identity, Listeners, Node};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = LanshareConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = LanshareConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        LanshareConfig::default()
    });

    // Shared directory
    let catalog = DirCatalog::open(config.catalog.share_dir.clone())?;
    tracing::info!(dir = %catalog.root().display(), "serving shared directory");
    let catalog: Arc<dyn LocalCatalog> = Arc::new(catalog);

    // Sockets first: nothing runs if a listener cannot be bound.
    let listeners = Listeners::bind(&config).await?;
    let message_port = listeners.message_port()?;

    let local = identity::local_address(&config, message_port);
    tracing::info!(addr = %local, "lanshared starting");

    let api_port = config.network.api_port;
    let default_ttl = config.search.default_ttl;
    let node = Node::new(config, local, catalog.clone());

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let tasks = node.spawn(listeners, shutdown_tx.subscribe());

    let (command_tx, command_rx) = command_channel();
    let command_task = tokio::spawn(node.clone().serve_commands(command_rx));

    let api_task = {
        let state = lanshare_api::ApiState {
            local,
            registry: node.registry().clone(),
            results: node.results().clone(),
            catalog,
            commands: command_tx,
            default_ttl,
        };
        tokio::spawn(async move {
            lanshare_api::serve(state, api_port)
                .await
                .context("API server failed")
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv()                    => tracing::info!("shutting down"),
        r = tasks.connections                     => tracing::error!("message listener exited: {:?}", r),
        r = optional(tasks.beacon_listener)       => tracing::error!("beacon listener exited: {:?}", r),
        r = optional(tasks.beacon_broadcast)      => tracing::error!("beacon broadcast exited: {:?}", r),
        r = command_task                          => tracing::error!("command loop exited: {:?}", r),
        r = api_task                              => tracing::error!("API server exited: {:?}", r),
    }

    Ok(())
}

/// Await a task that may not have been started; pends forever if absent.
async fn optional<T>(handle: Option<JoinHandle<T>>) -> Result<T, tokio::task::JoinError> {
    match handle {
        Some(h) => h.await,
        None => std::future::pending().await,
    }
}

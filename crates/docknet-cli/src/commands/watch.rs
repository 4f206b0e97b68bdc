//! Watch command

use std::sync::Arc;

use anyhow::Result;
use docknet_core::state::WatchEventKind;
use docknet_core::{DocknetManager, DocknetOperState, WatchEvent};
use log::info;
use tokio::sync::mpsc;

/// Watch command implementation
pub struct WatchCommand {
    manager: Arc<DocknetManager>,
}

impl WatchCommand {
    pub fn new(manager: Arc<DocknetManager>) -> Self {
        Self { manager }
    }

    /// Print binding changes until interrupted or the store ends the watch
    pub async fn execute(&self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel(64);
        let manager = Arc::clone(&self.manager);
        let watcher = tokio::spawn(async move { manager.watch_bindings(tx).await });

        println!("Watching docknet bindings (Ctrl-C to stop)");
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => println!("{}", describe_event(&event)),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping watch");
                    break;
                }
            }
        }

        drop(rx);
        watcher.await??;
        Ok(())
    }
}

pub fn describe_event(event: &WatchEvent<DocknetOperState>) -> String {
    let oper = event.current.as_ref().or(event.prev.as_ref());
    let network_id = oper.map(|o| o.docknet_uuid.as_str()).unwrap_or("-");

    let action = match event.kind() {
        WatchEventKind::Created => "created",
        WatchEventKind::Updated => "updated",
        WatchEventKind::Deleted => "deleted",
    };

    let id = oper.map(|o| o.id.as_str()).unwrap_or(event.key.as_str());
    format!("{:<8} {} -> {}", action, id, network_id)
}

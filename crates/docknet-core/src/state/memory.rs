//! In-process state store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use tokio::sync::{broadcast, mpsc, RwLock};

use super::{RawWatchEvent, StateDriver, StateResult};
use crate::error::StateError;

const CHANGE_BUFFER: usize = 256;

/// State driver keeping every value in memory.
///
/// Changes are fanned out to watchers over a broadcast channel, so a watcher
/// that falls too far behind loses events (logged as a warning).
#[derive(Clone)]
pub struct MemoryStateDriver {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    changes: broadcast::Sender<RawWatchEvent>,
}

impl MemoryStateDriver {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn notify(&self, key: &str, prev: Option<Vec<u8>>, current: Option<Vec<u8>>) {
        // No receivers is fine, nobody is watching
        let _ = self.changes.send(RawWatchEvent {
            key: key.to_string(),
            prev,
            current,
        });
    }
}

impl Default for MemoryStateDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateDriver for MemoryStateDriver {
    async fn write(&self, key: &str, value: &[u8]) -> StateResult<()> {
        let prev = {
            let mut entries = self.entries.write().await;
            entries.insert(key.to_string(), value.to_vec())
        };
        self.notify(key, prev, Some(value.to_vec()));
        Ok(())
    }

    async fn read(&self, key: &str) -> StateResult<Vec<u8>> {
        let entries = self.entries.read().await;
        entries.get(key).cloned().ok_or_else(|| StateError::NotFound {
            key: key.to_string(),
        })
    }

    async fn read_all(&self, prefix: &str) -> StateResult<Vec<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect())
    }

    async fn watch_all(
        &self,
        prefix: &str,
        events: mpsc::Sender<RawWatchEvent>,
    ) -> StateResult<()> {
        let mut changes = self.changes.subscribe();

        loop {
            tokio::select! {
                change = changes.recv() => match change {
                    Ok(change) if change.key.starts_with(prefix) => {
                        if events.send(change).await.is_err() {
                            return Ok(());
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("State watch on {} missed {} changes", prefix, missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                },
                _ = events.closed() => return Ok(()),
            }
        }
    }

    async fn clear(&self, key: &str) -> StateResult<()> {
        let prev = {
            let mut entries = self.entries.write().await;
            entries.remove(key)
        };
        if prev.is_some() {
            self.notify(key, prev, None);
        }
        Ok(())
    }
}

//! File per key state driver

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::fs;
use tokio::sync::mpsc;

use docknet_core::state::{RawWatchEvent, StateDriver, StateResult};
use docknet_core::StateError;

/// Default state directory
pub const DEFAULT_STATE_DIR: &str = "/var/lib/docknet/state";

/// How often a watch rescans its directory
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Suffix of in-flight write files, never reported as keys
const TMP_SUFFIX: &str = ".docknet-tmp";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// State driver storing every key as a file below a base directory.
///
/// Writes go through a hidden temporary file renamed into place, so readers
/// never see a partially written value. Watches poll the watched directory
/// and report the difference between two scans.
#[derive(Debug, Clone)]
pub struct FileStateDriver {
    base_path: PathBuf,
    poll_interval: Duration,
}

impl FileStateDriver {
    /// Create driver rooted at the default state directory
    pub fn new() -> Self {
        Self::with_base_path(DEFAULT_STATE_DIR)
    }

    /// Create driver with custom base path
    pub fn with_base_path<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> StateResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.as_os_str().is_empty() || key.ends_with(TMP_SUFFIX) {
            return Err(StateError::Backend {
                message: format!("invalid state key '{}'", key),
            });
        }
        Ok(self.base_path.join(relative))
    }

    /// Directory path and file name prefix covered by a key prefix
    fn prefix_location(&self, prefix: &str) -> StateResult<(String, PathBuf, String)> {
        let (dir_key, name_prefix) = match prefix.rfind('/') {
            Some(pos) => prefix.split_at(pos + 1),
            None => ("", prefix),
        };
        let dir = if dir_key.trim_matches('/').is_empty() {
            self.base_path.clone()
        } else {
            self.key_path(dir_key)?
        };
        Ok((dir_key.to_string(), dir, name_prefix.to_string()))
    }

    /// Current content of every key below `prefix`
    async fn snapshot(&self, prefix: &str) -> StateResult<HashMap<String, Vec<u8>>> {
        let (dir_key, dir, name_prefix) = self.prefix_location(prefix)?;
        let mut entries = HashMap::new();

        let mut listing = match fs::read_dir(&dir).await {
            Ok(listing) => listing,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(entries),
            Err(err) => return Err(io_error(&dir, err)),
        };

        while let Some(entry) = listing.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let file_name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };
            if file_name.ends_with(TMP_SUFFIX) || !file_name.starts_with(&name_prefix) {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| io_error(&path, e))?;
            if !file_type.is_file() {
                continue;
            }

            match fs::read(&path).await {
                Ok(content) => {
                    entries.insert(format!("{}{}", dir_key, file_name), content);
                }
                // Removed between listing and reading
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(io_error(&path, err)),
            }
        }

        Ok(entries)
    }
}

impl Default for FileStateDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateDriver for FileStateDriver {
    async fn write(&self, key: &str, value: &[u8]) -> StateResult<()> {
        let path = self.key_path(key)?;
        let parent = path.parent().unwrap_or(&self.base_path).to_path_buf();

        fs::create_dir_all(&parent)
            .await
            .map_err(|e| io_error(&parent, e))?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("state");
        let tmp_path = parent.join(format!(
            ".{}.{}-{}{}",
            file_name,
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            TMP_SUFFIX
        ));

        fs::write(&tmp_path, value)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        if let Err(err) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(io_error(&path, err));
        }

        debug!("Wrote state key {} to {}", key, path.display());
        Ok(())
    }

    async fn read(&self, key: &str) -> StateResult<Vec<u8>> {
        let path = self.key_path(key)?;
        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StateError::NotFound {
                key: key.to_string(),
            }),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    async fn read_all(&self, prefix: &str) -> StateResult<Vec<Vec<u8>>> {
        Ok(self.snapshot(prefix).await?.into_values().collect())
    }

    async fn watch_all(
        &self,
        prefix: &str,
        events: mpsc::Sender<RawWatchEvent>,
    ) -> StateResult<()> {
        info!(
            "Watching state prefix {} every {:?}",
            prefix, self.poll_interval
        );
        let mut known = self.snapshot(prefix).await?;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = events.closed() => return Ok(()),
            }

            let current = self.snapshot(prefix).await?;
            for change in diff_snapshots(&known, &current) {
                if events.send(change).await.is_err() {
                    return Ok(());
                }
            }
            known = current;
        }
    }

    async fn clear(&self, key: &str) -> StateResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path, err)),
        }
    }
}

fn diff_snapshots(
    old: &HashMap<String, Vec<u8>>,
    new: &HashMap<String, Vec<u8>>,
) -> Vec<RawWatchEvent> {
    let mut changes: Vec<RawWatchEvent> = new
        .iter()
        .filter(|(key, value)| old.get(*key) != Some(*value))
        .map(|(key, value)| RawWatchEvent {
            key: key.clone(),
            prev: old.get(key).cloned(),
            current: Some(value.clone()),
        })
        .collect();

    changes.extend(
        old.iter()
            .filter(|(key, _)| !new.contains_key(*key))
            .map(|(key, value)| RawWatchEvent {
                key: key.clone(),
                prev: Some(value.clone()),
                current: None,
            }),
    );

    changes.sort_by(|a, b| a.key.cmp(&b.key));
    changes
}

fn io_error(path: &Path, source: std::io::Error) -> StateError {
    StateError::Io {
        path: path.display().to_string(),
        source,
    }
}

//! State store abstractions
//!
//! A [`StateDriver`] stores opaque byte values under slash separated key
//! paths. Records are serialized to JSON on top of it through the typed
//! helpers in this module, each call site naming its concrete record type.

pub mod memory;

use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::StateError;

pub use memory::MemoryStateDriver;

/// Result type for state store operations
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Change notification for a single key, values still serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWatchEvent {
    pub key: String,
    pub prev: Option<Vec<u8>>,
    pub current: Option<Vec<u8>>,
}

/// Key/value backend shared by all state records
#[async_trait]
pub trait StateDriver: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    async fn write(&self, key: &str, value: &[u8]) -> StateResult<()>;

    /// Load the value stored under `key`
    async fn read(&self, key: &str) -> StateResult<Vec<u8>>;

    /// Load every value whose key starts with `prefix`
    async fn read_all(&self, prefix: &str) -> StateResult<Vec<Vec<u8>>>;

    /// Forward every change below `prefix` to `events`. Returns once the
    /// backend stops producing changes or the receiving side is dropped.
    async fn watch_all(&self, prefix: &str, events: mpsc::Sender<RawWatchEvent>)
        -> StateResult<()>;

    /// Remove the value stored under `key`; missing keys are not an error
    async fn clear(&self, key: &str) -> StateResult<()>;
}

/// Kind of change carried by a [`WatchEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Created,
    Updated,
    Deleted,
}

/// Decoded change notification for a record of type `T`
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent<T> {
    pub key: String,
    pub prev: Option<T>,
    pub current: Option<T>,
}

impl<T> WatchEvent<T> {
    pub fn kind(&self) -> WatchEventKind {
        match (&self.prev, &self.current) {
            (None, _) => WatchEventKind::Created,
            (Some(_), Some(_)) => WatchEventKind::Updated,
            (Some(_), None) => WatchEventKind::Deleted,
        }
    }
}

pub async fn write_state<T>(driver: &dyn StateDriver, key: &str, value: &T) -> StateResult<()>
where
    T: Serialize + Sync,
{
    let encoded = serde_json::to_vec(value)?;
    driver.write(key, &encoded).await
}

pub async fn read_state<T>(driver: &dyn StateDriver, key: &str) -> StateResult<T>
where
    T: DeserializeOwned,
{
    let raw = driver.read(key).await?;
    Ok(serde_json::from_slice(&raw)?)
}

pub async fn read_all_state<T>(driver: &dyn StateDriver, prefix: &str) -> StateResult<Vec<T>>
where
    T: DeserializeOwned,
{
    driver
        .read_all(prefix)
        .await?
        .iter()
        .map(|raw| serde_json::from_slice(raw).map_err(StateError::from))
        .collect()
}

/// Watch all records below `prefix`, decoding them into `T`.
///
/// Entries that fail to decode are logged and skipped. Runs until the
/// backend watch ends or `events` is closed.
pub async fn watch_all_state<T>(
    driver: &dyn StateDriver,
    prefix: &str,
    events: mpsc::Sender<WatchEvent<T>>,
) -> StateResult<()>
where
    T: DeserializeOwned + Send,
{
    let (raw_tx, mut raw_rx) = mpsc::channel::<RawWatchEvent>(64);

    let forward = async move {
        loop {
            let raw = tokio::select! {
                raw = raw_rx.recv() => match raw {
                    Some(raw) => raw,
                    None => break,
                },
                _ = events.closed() => break,
            };
            let event = match decode_event(raw) {
                Ok(event) => event,
                Err((key, err)) => {
                    warn!("Skipping undecodable state change for {}: {}", key, err);
                    continue;
                }
            };
            if events.send(event).await.is_err() {
                break;
            }
        }
    };

    let (watch_result, ()) = tokio::join!(driver.watch_all(prefix, raw_tx), forward);
    watch_result
}

fn decode_event<T>(raw: RawWatchEvent) -> Result<WatchEvent<T>, (String, serde_json::Error)>
where
    T: DeserializeOwned,
{
    let decode = |value: Option<Vec<u8>>| -> Result<Option<T>, serde_json::Error> {
        value.map(|bytes| serde_json::from_slice(&bytes)).transpose()
    };

    let prev = decode(raw.prev).map_err(|err| (raw.key.clone(), err))?;
    let current = decode(raw.current).map_err(|err| (raw.key.clone(), err))?;

    Ok(WatchEvent {
        key: raw.key,
        prev,
        current,
    })
}

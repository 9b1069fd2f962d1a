use super::KeyValueStore;
use crate::errors::TrackerError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Store backed by a JSON object on disk.
///
/// The file is re-read on every access so values written by another process
/// are picked up by the next poll. A missing file is an empty store; an empty
/// or malformed one is an error. Writes replace the file atomically.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, TrackerError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(TrackerError::Store(e.to_string())),
        };
        if contents.trim().is_empty() {
            return Err(TrackerError::Store(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        serde_json::from_str(&contents).map_err(|e| TrackerError::Store(e.to_string()))
    }

    /// Sibling file the next contents are written to before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        let values = self.load().await?;
        Ok(match values.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
    }

    async fn set(&self, key: &str, value: Option<String>) -> Result<(), TrackerError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        match value {
            Some(value) => {
                values.insert(key.to_string(), Value::String(value));
            }
            None => {
                values.remove(key);
            }
        }
        let contents = serde_json::to_string_pretty(&Value::Object(values))
            .map_err(|e| TrackerError::Store(e.to_string()))?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, contents)
            .await
            .map_err(|e| TrackerError::Store(e.to_string()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| TrackerError::Store(e.to_string()))?;
        debug!(path = %self.path.display(), key, "Store updated");
        Ok(())
    }
}

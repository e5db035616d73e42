//! Shared key-value stores backing throttle flags

use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Key-value store with per-entry expiry
#[async_trait]
pub trait ThrottleStore: Send + Sync + fmt::Debug {
    /// Store a value that expires after `ttl`
    async fn put(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<()>;

    /// Read a value, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<JsonValue>>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Process-wide store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, (JsonValue, Instant)>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    /// Whether the store holds no live entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ThrottleStore for InMemoryStore {
    async fn put(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone()))
    }
}

// ============================================================================
// File Store
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: JsonValue,
    expires_at: DateTime<Utc>,
}

/// Write locks shared by every `FileStore` opened on the same path
static WRITE_LOCKS: LazyLock<std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| std::sync::Mutex::new(HashMap::new()));

/// Suffix for temporary files, unique within the process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON-file store shared by every process pointing at the same path.
///
/// Writes go to a temporary file first and are renamed into place.
/// Read-modify-write cycles are serialized within one process only; stores
/// opened on the same path string share one lock.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Create a store backed by the given file (created on first write)
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let write_lock = WRITE_LOCKS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.clone())
            .or_default()
            .clone();
        Self { path, write_lock }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, StoredEntry>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                Error::store(format!(
                    "Failed to parse store file '{}': {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::store(format!(
                "Failed to read store file '{}': {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, entries: &HashMap<String, StoredEntry>) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension(format!(
            "tmp.{}.{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::store(format!("Failed to write store file: {e}")))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::store(format!("Failed to rename store file: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ThrottleStore for FileStore {
    async fn put(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::store(format!("Invalid ttl: {e}")))?;

        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let mut entries = self.load().await?;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            StoredEntry {
                value,
                expires_at: now + ttl,
            },
        );
        self.save(&entries).await
    }

    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let now = Utc::now();
        Ok(self
            .load()
            .await?
            .remove(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value))
    }
}

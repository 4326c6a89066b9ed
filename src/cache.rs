//! Response cache for upstream JSON payloads
//!
//! Resolvers never talk to a cache directly; they ask
//! [`Context::cache_response`](crate::Context::cache_response) for a URL and a
//! time-to-live, and the context consults whichever [`ResponseCache`] it was
//! built with. Entries older than the requested ttl are treated as misses and
//! overwritten by the next fetch.

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Return the cached payload for `key` if it was stored less than `ttl` ago
    async fn get(&self, key: &str, ttl: Duration) -> Result<Option<Value>>;

    async fn put(&self, key: &str, value: &Value) -> Result<()>;

    /// Drop every entry
    async fn clear(&self) -> Result<()>;
}

/// In-process cache; contents die with the process
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str, ttl: Duration) -> Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| crate::Error::Other("Response cache lock poisoned".to_string()))?;

        Ok(entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < ttl)
            .map(|(_, value)| value.clone()))
    }

    async fn put(&self, key: &str, value: &Value) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| crate::Error::Other("Response cache lock poisoned".to_string()))?;
        entries.insert(key.to_string(), (Instant::now(), value.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| crate::Error::Other("Response cache lock poisoned".to_string()))?;
        entries.clear();
        Ok(())
    }
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk cache, one JSON file per key
///
/// Files are named by the SHA-256 of the key so arbitrary URLs map to safe
/// file names. Freshness comes from the file's modification time.
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.dir
            .join(format!("{}.json", hex::encode(hasher.finalize())))
    }
}

#[async_trait]
impl ResponseCache for DiskCache {
    async fn get(&self, key: &str, ttl: Duration) -> Result<Option<Value>> {
        let path = self.entry_path(key);

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let age = SystemTime::now()
            .duration_since(metadata.modified()?)
            .unwrap_or_default();
        if age >= ttl {
            tracing::debug!(key, ?age, "cached response is stale");
            return Ok(None);
        }

        let content = tokio::fs::read(&path).await?;
        match serde_json::from_slice(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // A torn write is just a miss; the next fetch overwrites it.
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache entry");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: &Value) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.entry_path(key);
        // Unique per writer so concurrent puts never share a temp file.
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{}.{}.tmp", std::process::id(), seq));
        tokio::fs::write(&tmp, serde_json::to_vec(value)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_cache_respects_ttl() {
        let cache = MemoryCache::new();
        cache.put("k", &json!({"a": 1})).await.unwrap();

        let hit = cache.get("k", Duration::from_secs(60)).await.unwrap();
        assert_eq!(hit, Some(json!({"a": 1})));

        let stale = cache.get("k", Duration::ZERO).await.unwrap();
        assert_eq!(stale, None);

        cache.clear().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_disk_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("responses"));

        assert_eq!(cache.get("https://x/y", Duration::from_secs(60)).await.unwrap(), None);

        cache.put("https://x/y", &json!([1, 2, 3])).await.unwrap();
        assert!(cache.entry_path("https://x/y").exists());
        assert_eq!(
            cache.get("https://x/y", Duration::from_secs(60)).await.unwrap(),
            Some(json!([1, 2, 3]))
        );
        assert_eq!(cache.get("https://x/y", Duration::ZERO).await.unwrap(), None);

        cache.clear().await.unwrap();
        assert!(!cache.dir().exists());
        // Clearing twice is fine
        cache.clear().await.unwrap();
    }

    #[test]
    fn test_entry_paths_differ_per_key() {
        let cache = DiskCache::new("/tmp/cache");
        assert_ne!(cache.entry_path("a"), cache.entry_path("b"));
        assert_eq!(cache.entry_path("a"), cache.entry_path("a"));
    }

    #[tokio::test]
    async fn test_disk_cache_ignores_corrupt_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        std::fs::write(cache.entry_path("k"), b"{not json").unwrap();

        assert_eq!(cache.get("k", Duration::from_secs(60)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_disk_puts_on_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = std::sync::Arc::new(DiskCache::new(dir.path().join("responses")));

        let mut tasks = tokio::task::JoinSet::new();
        for n in 0..16 {
            let cache = std::sync::Arc::clone(&cache);
            tasks.spawn(async move { cache.put("https://x/catalogue", &json!({ "n": n })).await });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        let value = cache
            .get("https://x/catalogue", Duration::from_secs(60))
            .await
            .unwrap()
            .unwrap();
        assert!(value["n"].as_u64().unwrap() < 16);

        let leftovers: Vec<_> = std::fs::read_dir(cache.dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

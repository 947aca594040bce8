use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::PathBuf,
    sync::Arc,
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Whole-collection persistence: load everything, replace everything.
#[async_trait]
pub trait RecordStore<T>: Send + Sync {
    async fn load_all(&self) -> Result<Vec<T>, StoreError>;
    async fn replace_all(&self, records: &[T]) -> Result<(), StoreError>;
}

/// One JSON array per file. A missing file reads as an empty collection.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load_all(&self) -> Result<Vec<T>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn replace_all(&self, records: &[T]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let body = serde_json::to_vec_pretty(records)?;
        // write-then-rename keeps readers off half-written files
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Test backend; nothing touches the disk.
#[cfg(test)]
pub struct MemoryStore<T> {
    records: std::sync::Mutex<Vec<T>>,
}

#[cfg(test)]
impl<T> MemoryStore<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: std::sync::Mutex::new(records),
        }
    }
}

#[cfg(test)]
impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
#[async_trait]
impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    async fn load_all(&self) -> Result<Vec<T>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "memory store poisoned"))?;
        Ok(records.clone())
    }

    async fn replace_all(&self, records: &[T]) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "memory store poisoned"))?;
        *guard = records.to_vec();
        Ok(())
    }
}

/// A record store plus a single writer lock.
///
/// Every `update` runs load, mutate and replace while holding the lock, so two
/// requests touching the same collection can't interleave and drop each
/// other's writes. The snapshot is only written back when the mutation
/// returns `Ok`.
pub struct Collection<T> {
    name: &'static str,
    store: Arc<dyn RecordStore<T>>,
    lock: Mutex<()>,
}

impl<T> Collection<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(name: &'static str, store: Arc<dyn RecordStore<T>>) -> Self {
        Self {
            name,
            store,
            lock: Mutex::new(()),
        }
    }

    pub async fn read(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.lock.lock().await;
        self.store.load_all().await
    }

    pub async fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load_all().await?;
        let out = mutate(&mut records)?;
        self.store.replace_all(&records).await?;
        debug!(collection = self.name, records = records.len(), "collection persisted");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        label: String,
    }

    fn row(id: u32, label: &str) -> Row {
        Row {
            id,
            label: label.into(),
        }
    }

    #[tokio::test]
    async fn json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::<Row>::new(dir.path().join("rows.json"));
        assert!(store.load_all().await.expect("load").is_empty());
    }

    #[tokio::test]
    async fn json_store_replace_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::<Row>::new(dir.path().join("nested").join("rows.json"));
        store
            .replace_all(&[row(1, "a"), row(2, "b")])
            .await
            .expect("replace");

        let loaded = store.load_all().await.expect("load");
        assert_eq!(loaded, vec![row(1, "a"), row(2, "b")]);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn json_store_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rows.json");
        std::fs::write(&path, b"{not json").expect("write");
        let store = JsonFileStore::<Row>::new(path);
        assert!(matches!(store.load_all().await, Err(StoreError::Decode(_))));
    }

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("nope")]
        Nope,
        #[error(transparent)]
        Store(#[from] StoreError),
    }

    #[tokio::test]
    async fn failed_update_persists_nothing() {
        let store: Arc<dyn RecordStore<Row>> = Arc::new(MemoryStore::new(vec![row(1, "a")]));
        let rows = Collection::new("rows", store);

        let res: Result<(), TestError> = rows
            .update(|all| {
                all.push(row(2, "b"));
                Err(TestError::Nope)
            })
            .await;
        assert!(matches!(res, Err(TestError::Nope)));
        assert_eq!(rows.read().await.expect("read"), vec![row(1, "a")]);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let store: Arc<dyn RecordStore<Row>> = Arc::new(MemoryStore::default());
        let rows = Arc::new(Collection::new("rows", store));

        let mut handles = Vec::new();
        for i in 0..32u32 {
            let rows = rows.clone();
            handles.push(tokio::spawn(async move {
                rows.update(|all| {
                    all.push(row(i, "x"));
                    Ok::<_, StoreError>(())
                })
                .await
            }));
        }
        for h in handles {
            h.await.expect("join").expect("update");
        }

        assert_eq!(rows.read().await.expect("read").len(), 32);
    }
}

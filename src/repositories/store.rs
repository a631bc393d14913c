//! File-backed record store.
//!
//! Each collection lives in one JSON document of the form
//! `{ "<collection>": [ ...records ] }`. Every operation loads the whole
//! document, optionally mutates it and writes it back in full. All access to
//! one collection goes through a shared async mutex, so a load-mutate-save
//! cycle never interleaves with another one on the same collection.

use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Errors raised while reading or writing a collection document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed collection document {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Collection '{collection}' missing or not an array in {}", path.display())]
    MissingCollection {
        path: PathBuf,
        collection: &'static str,
    },

    #[error("Failed to serialize collection: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Writer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// Short description of the operation that failed, safe to expose in logs
    /// and error summaries.
    pub fn operation(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "access collection file",
            StoreError::Parse { .. } | StoreError::MissingCollection { .. } => "load collection",
            StoreError::Serialize(_) | StoreError::Task(_) => "save collection",
        }
    }
}

/// Whole-document JSON persistence for a named collection of `T` records.
///
/// Cloning is cheap and every clone shares the same write lock.
pub struct JsonStore<T> {
    path: PathBuf,
    collection: &'static str,
    lock: Arc<Mutex<()>>,
    _records: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonStore<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            collection: self.collection,
            lock: Arc::clone(&self.lock),
            _records: PhantomData,
        }
    }
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a store for `collection` backed by the file at `path`.
    ///
    /// Nothing touches the disk until the first operation.
    pub fn new(path: impl Into<PathBuf>, collection: &'static str) -> Self {
        Self {
            path: path.into(),
            collection,
            lock: Arc::new(Mutex::new(())),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record of the collection.
    ///
    /// A missing file is initialized to an empty collection and persisted
    /// before returning.
    pub async fn load(&self) -> Result<Vec<T>, StoreError> {
        let guard = self.lock().await;
        let (records, _guard) = self.load_locked(guard).await?;
        Ok(records)
    }

    /// Overwrites the collection with `records`.
    pub async fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let guard = self.lock().await;
        self.save_locked(records, guard).await?;
        Ok(())
    }

    /// Loads the collection and hands it to `f` without writing anything back.
    pub async fn read<R>(&self, f: impl FnOnce(Vec<T>) -> R) -> Result<R, StoreError> {
        let guard = self.lock().await;
        let (records, _guard) = self.load_locked(guard).await?;
        Ok(f(records))
    }

    /// Runs a full read-modify-write cycle under the collection lock.
    ///
    /// The document is rewritten after `f` returns, even if `f` left the
    /// records untouched. If the caller is dropped while the write is in
    /// flight, the lock stays held until the file has been replaced.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, StoreError> {
        let guard = self.lock().await;
        let (mut records, guard) = self.load_locked(guard).await?;
        let result = f(&mut records);
        self.save_locked(&records, guard).await?;
        Ok(result)
    }

    async fn lock(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.lock).lock_owned().await
    }

    async fn load_locked(
        &self,
        guard: OwnedMutexGuard<()>,
    ) -> Result<(Vec<T>, OwnedMutexGuard<()>), StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    collection = self.collection,
                    path = %self.path.display(),
                    "Collection file missing, initializing empty collection"
                );
                let guard = self.save_locked(&[], guard).await?;
                return Ok((Vec::new(), guard));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut document: Map<String, Value> =
            serde_json::from_str(&text).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let array = match document.remove(self.collection) {
            Some(value @ Value::Array(_)) => value,
            _ => {
                return Err(StoreError::MissingCollection {
                    path: self.path.clone(),
                    collection: self.collection,
                });
            }
        };

        let records: Vec<T> = serde_json::from_value(array).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            collection = self.collection,
            count = records.len(),
            "Collection loaded"
        );
        Ok((records, guard))
    }

    /// Writes the document on the blocking pool. The guard moves into the
    /// writer task and comes back with its result, so the lock is released
    /// no earlier than the rename.
    async fn save_locked(
        &self,
        records: &[T],
        guard: OwnedMutexGuard<()>,
    ) -> Result<OwnedMutexGuard<()>, StoreError> {
        let mut document = Map::new();
        document.insert(
            self.collection.to_string(),
            serde_json::to_value(records).map_err(StoreError::Serialize)?,
        );
        let mut bytes =
            serde_json::to_vec_pretty(&Value::Object(document)).map_err(StoreError::Serialize)?;
        bytes.push(b'\n');

        let path = self.path.clone();
        let (written, guard) = tokio::task::spawn_blocking(move || {
            let written = write_atomic(&path, &bytes);
            (written, guard)
        })
        .await?;
        written?;

        tracing::debug!(
            collection = self.collection,
            count = records.len(),
            "Collection saved"
        );
        Ok(guard)
    }
}

/// Replaces `path` with `bytes` via a temp file in the same directory,
/// fsync and rename. Readers see either the old or the new document.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.as_file_mut().write_all(bytes).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u32,
        text: String,
    }

    fn note(id: u32, text: &str) -> Note {
        Note {
            id,
            text: text.to_string(),
        }
    }

    fn store_in(dir: &TempDir) -> JsonStore<Note> {
        JsonStore::new(dir.path().join("notes.json"), "notes")
    }

    #[tokio::test]
    async fn test_load_initializes_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let records = store.load().await.unwrap();
        assert!(records.is_empty());

        let text = std::fs::read_to_string(store.path()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({ "notes": [] }));
    }

    #[tokio::test]
    async fn test_load_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<Note> =
            JsonStore::new(dir.path().join("nested/data/notes.json"), "notes");

        assert!(store.load().await.unwrap().is_empty());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let notes = vec![note(2, "b"), note(1, "a"), note(3, "c")];

        store.save(&notes).await.unwrap();
        assert_eq!(store.load().await.unwrap(), notes);
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json_under_collection_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[note(1, "a")]).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n  \"notes\": ["));
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_missing_collection_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{ "other": [] }"#).unwrap();

        let result = store.load().await;
        assert!(matches!(
            result,
            Err(StoreError::MissingCollection { collection: "notes", .. })
        ));
    }

    #[tokio::test]
    async fn test_mutate_persists_changes_and_returns_result() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[note(1, "a")]).await.unwrap();

        let len = store
            .mutate(|notes| {
                notes.push(note(2, "b"));
                notes.len()
            })
            .await
            .unwrap();

        assert_eq!(len, 2);
        assert_eq!(store.load().await.unwrap(), vec![note(1, "a"), note(2, "b")]);
    }

    #[tokio::test]
    async fn test_read_does_not_persist_changes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[note(1, "a")]).await.unwrap();

        let count = store
            .read(|mut notes| {
                notes.clear();
                notes.len()
            })
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut handles = Vec::new();
        for id in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .mutate(|notes| notes.push(note(id, "concurrent")))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut ids: Vec<u32> = store.load().await.unwrap().iter().map(|n| n.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..16).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_cancelled_mutation_holds_lock_until_write_lands() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let bulk: Vec<Note> = (0..20_000)
            .map(|id| note(id, "padding to make every write take a while"))
            .collect();
        store.save(&bulk).await.unwrap();

        for round in 0..12u32 {
            let dropped_id = 100_000 + round;
            let outcome = tokio::time::timeout(
                Duration::from_millis(u64::from(round) + 1),
                store.mutate(|notes| notes.push(note(dropped_id, "dropped"))),
            )
            .await;

            if outcome.is_err() && store.lock.try_lock().is_ok() {
                // Lock is free, so no abandoned writer may still replace the file
                let before = std::fs::read(store.path()).unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(before, std::fs::read(store.path()).unwrap(), "round {round}");
            }

            let kept_id = 200_000 + round;
            store
                .mutate(|notes| notes.push(note(kept_id, "kept")))
                .await
                .unwrap();
            let notes = store.load().await.unwrap();
            assert!(notes.iter().any(|n| n.id == kept_id), "round {round}");
        }
    }

    #[tokio::test]
    async fn test_lock_is_held_for_the_whole_write() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let guard = store.lock().await;

        let writer = {
            let store = store.clone();
            tokio::spawn(async move { store.save_locked(&[note(1, "a")], guard).await.map(drop) })
        };
        // The guard now belongs to the writer; a second caller waits for it
        let waited = store.mutate(|notes| notes.len()).await.unwrap();
        writer.await.unwrap().unwrap();

        assert_eq!(waited, 1);
    }

    #[test]
    fn test_store_error_operation() {
        let error = StoreError::Io {
            path: PathBuf::from("x.json"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(error.operation(), "access collection file");
    }
}

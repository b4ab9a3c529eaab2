//! The record store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, info};

use crate::observability::metrics;
use crate::store::persist::Persister;
use crate::store::record::{Fields, Filter, Record};
use crate::store::{StoreError, StoreResult};

/// Collection name → records in insertion order.
pub type Document = BTreeMap<String, Vec<Record>>;

/// In-memory document store, rewritten to disk after every mutation.
///
/// `Database` is a handle: clones share the same document and writer.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    document: RwLock<Document>,
    persister: Option<Persister>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the store backed by `path`.
    ///
    /// A missing file starts an empty document and persists it right away.
    /// An unreadable or unparsable file is an error; it is never overwritten.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let (document, fresh) = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => (Document::new(), true),
            Ok(contents) => {
                let document: Document = serde_json::from_str(&contents)
                    .map_err(|source| StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                (document, false)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Document::new(), true),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        info!(
            path = %path.display(),
            collections = document.len(),
            records = document.values().map(Vec::len).sum::<usize>(),
            fresh,
            "Data file loaded"
        );

        let database = Self {
            inner: Arc::new(Inner {
                document: RwLock::new(document),
                persister: Some(Persister::spawn(path.clone())),
                path: Some(path),
            }),
        };

        if fresh {
            database.persist(&database.write());
        }

        Ok(database)
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                document: RwLock::new(Document::new()),
                persister: None,
                path: None,
            }),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Append a record to `collection`, creating it if absent.
    pub fn insert(&self, collection: &str, record: Record) -> Record {
        let mut document = self.write();
        document
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        metrics::record_mutation(collection, "insert");
        self.persist(&document);
        record
    }

    /// All records of `collection`, or those matching `filter`.
    ///
    /// Fails with [`StoreError::FieldNotFound`] if the filter names a field a
    /// tested record does not have.
    pub fn select(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<Vec<Record>> {
        let document = self.read();
        let Some(records) = document.get(collection) else {
            return Ok(Vec::new());
        };

        match filter.filter(|f| !f.is_empty()) {
            None => Ok(records.clone()),
            Some(filter) => {
                let mut selected = Vec::new();
                for record in records {
                    if filter.matches(record)? {
                        selected.push(record.clone());
                    }
                }
                Ok(selected)
            }
        }
    }

    /// First record with `id`, if any.
    pub fn find(&self, collection: &str, id: &str) -> Option<Record> {
        self.read()
            .get(collection)
            .and_then(|records| records.iter().find(|r| r.id == id).cloned())
    }

    /// Replace every field of the record with `data`, keeping its id.
    /// Returns `false` (and does nothing) if no such record exists.
    pub fn update(&self, collection: &str, id: &str, data: Fields) -> bool {
        self.mutate(collection, id, "update", |record| record.replace(data))
    }

    /// Overlay `data` onto the record; fields absent from `data` survive.
    pub fn partial_update(&self, collection: &str, id: &str, data: Fields) -> bool {
        self.mutate(collection, id, "partial_update", |record| record.merge(data))
    }

    /// Run `apply` on the record with `id` while holding the write lock, so
    /// read-modify-write sequences cannot interleave.
    ///
    /// Returns `Ok(None)` if there is no such record. Nothing is persisted
    /// when `apply` fails.
    pub fn modify<T, F>(&self, collection: &str, id: &str, apply: F) -> StoreResult<Option<T>>
    where
        F: FnOnce(&mut Record) -> StoreResult<T>,
    {
        let mut document = self.write();
        let Some(record) = document
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
        else {
            return Ok(None);
        };
        let value = apply(record)?;
        metrics::record_mutation(collection, "modify");
        self.persist(&document);
        Ok(Some(value))
    }

    /// Remove the first record with `id`.
    pub fn delete(&self, collection: &str, id: &str) -> bool {
        let mut document = self.write();
        let Some(records) = document.get_mut(collection) else {
            return false;
        };
        let Some(index) = records.iter().position(|r| r.id == id) else {
            return false;
        };
        records.remove(index);
        metrics::record_mutation(collection, "delete");
        self.persist(&document);
        true
    }

    /// Wait until all queued writes have reached disk.
    pub async fn flush(&self) {
        if let Some(persister) = &self.inner.persister {
            persister.flush().await;
        }
    }

    fn mutate<F>(&self, collection: &str, id: &str, op: &'static str, apply: F) -> bool
    where
        F: FnOnce(&mut Record),
    {
        let mut document = self.write();
        let Some(record) = document
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
        else {
            return false;
        };
        apply(record);
        metrics::record_mutation(collection, op);
        self.persist(&document);
        true
    }

    /// Queue a snapshot. Called with the write lock held so snapshots are
    /// handed to the writer in mutation order.
    fn persist(&self, document: &Document) {
        let Some(persister) = &self.inner.persister else {
            return;
        };
        match serde_json::to_string(document) {
            Ok(snapshot) => persister.write(snapshot),
            Err(e) => error!(error = %e, "Failed to serialize document"),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.inner
            .document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.inner
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

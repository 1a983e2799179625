//! Persistence collaborator and its backends
//!
//! The engine hands document fields to a [`Persistence`] implementation and
//! only cares whether the save succeeded. [`FileStore`] keeps one JSON record
//! per document on disk; [`MemoryStore`] keeps them in memory.

use crate::document::DocumentFields;
use crate::error::{PersistenceError, PersistenceResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Remote-or-local document store
pub trait Persistence: Send + Sync + 'static {
    /// Write the given fields onto the record for `document_id`.
    ///
    /// Fields left unset (`slug`, `status`) keep their stored value.
    fn save(
        &self,
        document_id: &str,
        fields: DocumentFields,
    ) -> impl Future<Output = PersistenceResult<()>> + Send;
}

/// Overlay `fields` onto an existing JSON record
fn merge_record(existing: Option<Value>, fields: &DocumentFields, document_id: &str) -> PersistenceResult<Value> {
    let update = serde_json::to_value(fields).map_err(|source| PersistenceError::Serialize {
        document_id: document_id.to_string(),
        source,
    })?;

    let mut record = match existing {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Value::Object(update) = update {
        record.extend(update);
    }
    Ok(Value::Object(record))
}

/// One JSON file per document under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn in_data_dir() -> crate::error::ConfigResult<Self> {
        Ok(Self::new(crate::config::Config::data_dir()?.join("documents")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for a document.
    ///
    /// Ids that could resolve outside the store directory are rejected.
    pub fn record_path(&self, document_id: &str) -> PersistenceResult<PathBuf> {
        let invalid = document_id.is_empty()
            || document_id.contains("..")
            || document_id.contains(['/', '\\', '\0']);
        if invalid {
            return Err(PersistenceError::InvalidId(document_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", document_id)))
    }

    /// Read the stored record, if any
    pub async fn load(&self, document_id: &str) -> PersistenceResult<Option<Value>> {
        let path = self.record_path(document_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    log::warn!("Ignoring unreadable record {}: {}", path.display(), e);
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::ReadError { path, source }),
        }
    }

    async fn write_record(&self, document_id: &str, fields: DocumentFields) -> PersistenceResult<()> {
        let path = self.record_path(document_id)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceError::WriteError {
                document_id: document_id.to_string(),
                path: self.dir.clone(),
                source,
            })?;

        let existing = self.load(document_id).await?;
        let record = merge_record(existing, &fields, document_id)?;
        let text = serde_json::to_string_pretty(&record).map_err(|source| {
            PersistenceError::Serialize {
                document_id: document_id.to_string(),
                source,
            }
        })?;

        write_atomic(&path, document_id, &text).await?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl Persistence for FileStore {
    fn save(
        &self,
        document_id: &str,
        fields: DocumentFields,
    ) -> impl Future<Output = PersistenceResult<()>> + Send {
        let store = self.clone();
        let document_id = document_id.to_string();
        async move { store.write_record(&document_id, fields).await }
    }
}

/// Write to a sibling temp file, then rename it over the target
async fn write_atomic(path: &Path, document_id: &str, content: &str) -> PersistenceResult<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, uuid::Uuid::new_v4()));

    let write_result = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, content.as_bytes()).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;
        file.sync_all().await?;
        Ok::<(), std::io::Error>(())
    }
    .await;

    if let Err(source) = write_result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(PersistenceError::WriteError {
            document_id: document_id.to_string(),
            path: path.to_path_buf(),
            source,
        });
    }

    if let Err(source) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(PersistenceError::RenameError {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// In-memory store; records every save and merges like [`FileStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    records: HashMap<String, Value>,
    saves: Vec<(String, DocumentFields)>,
    reject_with: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following save fail with [`PersistenceError::Rejected`]
    pub fn reject_saves(&self, reason: impl Into<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.reject_with = Some(reason.into());
        }
    }

    /// Every accepted save, oldest first
    pub fn saves(&self) -> Vec<(String, DocumentFields)> {
        self.inner
            .lock()
            .map(|inner| inner.saves.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.saves.len()).unwrap_or(0)
    }

    /// Merged record for a document
    pub fn record(&self, document_id: &str) -> Option<Value> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.records.get(document_id).cloned())
    }

    fn store(&self, document_id: &str, fields: DocumentFields) -> PersistenceResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| PersistenceError::Rejected("store lock poisoned".to_string()))?;

        if let Some(reason) = &inner.reject_with {
            return Err(PersistenceError::Rejected(reason.clone()));
        }

        let existing = inner.records.remove(document_id);
        let record = merge_record(existing, &fields, document_id)?;
        inner.records.insert(document_id.to_string(), record);
        inner.saves.push((document_id.to_string(), fields));
        Ok(())
    }
}

impl Persistence for MemoryStore {
    fn save(
        &self,
        document_id: &str,
        fields: DocumentFields,
    ) -> impl Future<Output = PersistenceResult<()>> + Send {
        let result = self.store(document_id, fields);
        async move { result }
    }
}

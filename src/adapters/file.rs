use crate::domain::model::{ObjectKey, ResourceKind, StoredObject};
use crate::domain::ports::ResourceStore;
use crate::utils::error::{StoreError, StoreResult};
use crate::utils::validation::path_segment_problem;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores each object as `<root>/<kind plural>/<namespace>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn namespace_dir(&self, kind: ResourceKind, namespace: &str) -> StoreResult<PathBuf> {
        check_segment(namespace)?;
        Ok(self.base_path.join(kind.plural()).join(namespace))
    }

    fn object_path(&self, key: &ObjectKey) -> StoreResult<PathBuf> {
        check_segment(&key.name)?;
        Ok(self
            .namespace_dir(key.kind, &key.namespace)?
            .join(format!("{}.json", key.name)))
    }
}

fn check_segment(value: &str) -> StoreResult<()> {
    match path_segment_problem(value) {
        None => Ok(()),
        Some(reason) => Err(StoreError::InvalidKey {
            value: value.to_string(),
            reason: reason.to_string(),
        }),
    }
}

fn map_not_found(err: std::io::Error, key: &ObjectKey) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound { key: key.clone() }
    } else {
        StoreError::IoError(err)
    }
}

impl ResourceStore for FileStore {
    async fn create(&self, mut object: StoredObject) -> StoreResult<()> {
        let key = object.key();
        let target = self.object_path(&key)?;
        let dir = self.namespace_dir(key.kind, &key.namespace)?;

        object
            .metadata
            .creation_timestamp
            .get_or_insert_with(chrono::Utc::now);
        let data = serde_json::to_vec_pretty(&object)?;

        tokio::fs::create_dir_all(&dir).await?;

        // 先寫暫存檔再 hard link；目標已存在時 link 會原子性失敗
        let linked = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&data)?;
            tmp.as_file().sync_all()?;
            std::fs::hard_link(tmp.path(), &target)
        })
        .await
        .map_err(|e| StoreError::IoError(std::io::Error::other(e)))?;

        match linked {
            Ok(()) => {
                tracing::debug!("Created {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists { key })
            }
            Err(e) => Err(StoreError::IoError(e)),
        }
    }

    async fn get(&self, key: &ObjectKey) -> StoreResult<StoredObject> {
        let path = self.object_path(key)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| map_not_found(e, key))?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn list(&self, kind: ResourceKind, namespace: &str) -> StoreResult<Vec<StoredObject>> {
        let dir = self.namespace_dir(kind, namespace)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut objects = Vec::with_capacity(paths.len());
        for path in paths {
            match tokio::fs::read(&path).await {
                Ok(data) => objects.push(serde_json::from_slice(&data)?),
                // removed between read_dir and read
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(objects)
    }

    async fn delete(&self, key: &ObjectKey) -> StoreResult<()> {
        let path = self.object_path(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| map_not_found(e, key))?;
        tracing::debug!("Deleted {}", key);
        Ok(())
    }
}

use crate::domain::model::{ObjectKey, ResourceKind, StoredObject};
use crate::domain::ports::ResourceStore;
use crate::utils::error::{StoreError, StoreResult};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store. Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<ObjectKey, StoredObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl ResourceStore for MemoryStore {
    async fn create(&self, mut object: StoredObject) -> StoreResult<()> {
        let key = object.key();
        let mut objects = self.objects.write().await;
        match objects.entry(key) {
            Entry::Occupied(entry) => Err(StoreError::AlreadyExists {
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                object
                    .metadata
                    .creation_timestamp
                    .get_or_insert_with(chrono::Utc::now);
                entry.insert(object);
                Ok(())
            }
        }
    }

    async fn get(&self, key: &ObjectKey) -> StoreResult<StoredObject> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    async fn list(&self, kind: ResourceKind, namespace: &str) -> StoreResult<Vec<StoredObject>> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|(key, _)| key.kind == kind && key.namespace == namespace)
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn delete(&self, key: &ObjectKey) -> StoreResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }
}

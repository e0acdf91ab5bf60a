use crate::domain::model::{AllowedUpstream, ObjectKey, ResourceKind, StoredObject};
use crate::utils::error::{Result, StoreResult};
use async_trait::async_trait;

/// Declarative object store keyed by (kind, namespace, name).
///
/// `create` must be atomic: of two concurrent creates for the same key at
/// most one succeeds, the other fails with `StoreError::AlreadyExists`.
pub trait ResourceStore: Send + Sync {
    fn create(
        &self,
        object: StoredObject,
    ) -> impl std::future::Future<Output = StoreResult<()>> + Send;

    /// Fails with `StoreError::NotFound` when the key is absent.
    fn get(
        &self,
        key: &ObjectKey,
    ) -> impl std::future::Future<Output = StoreResult<StoredObject>> + Send;

    /// Order is backend-defined.
    fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> impl std::future::Future<Output = StoreResult<Vec<StoredObject>>> + Send;

    /// Fails with `StoreError::NotFound` when the key is absent.
    fn delete(&self, key: &ObjectKey) -> impl std::future::Future<Output = StoreResult<()>> + Send;
}

/// Client side of the instance ACL endpoints.
#[async_trait]
pub trait AccessControlList: Send + Sync {
    async fn add(&self, instance: &str, host: &str, port: u16) -> Result<()>;
    async fn list(&self, instance: &str) -> Result<Vec<AllowedUpstream>>;
    async fn remove(&self, instance: &str, host: &str, port: u16) -> Result<()>;
}

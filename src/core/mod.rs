pub mod instances;
pub mod plans;

pub use crate::domain::model::{Plan, PlanSummary, ServiceInstance, StoredObject};
pub use crate::domain::ports::ResourceStore;
pub use crate::utils::error::{ProvisionError, StoreError, StoreResult};

use std::future::Future;
use std::time::Duration;

/// Runs `operation` under the request deadline, if one is set.
/// Expiry drops the pending work and is reported, never retried.
pub(crate) async fn bounded<T, E>(
    limit: Option<Duration>,
    operation: impl Future<Output = Result<T, E>>,
) -> Result<T, E>
where
    E: From<StoreError>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, operation)
            .await
            .map_err(|_| E::from(StoreError::Timeout(limit)))?,
        None => operation.await,
    }
}

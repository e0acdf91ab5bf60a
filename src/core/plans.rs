use crate::core::bounded;
use crate::domain::model::{
    ObjectKey, Plan, PlanSummary, ResourceKind, DEFAULT_PLAN_DESCRIPTION,
};
use crate::domain::ports::ResourceStore;
use crate::utils::error::{StoreError, StoreResult};
use std::time::Duration;

/// Read-only view of the plans in one namespace.
#[derive(Debug, Clone)]
pub struct PlanCatalog<S: ResourceStore> {
    store: S,
    namespace: String,
    timeout: Option<Duration>,
}

impl<S: ResourceStore> PlanCatalog<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Looks up a plan by name; `None` when the catalog has no such plan,
    /// including names no plan could ever be stored under.
    pub async fn find_plan(&self, name: &str) -> StoreResult<Option<Plan>> {
        let key = ObjectKey::new(ResourceKind::RpaasPlan, self.namespace.as_str(), name);
        match bounded(self.timeout, self.store.get(&key)).await {
            Ok(object) => Ok(Some(Plan::try_from(object)?)),
            Err(StoreError::NotFound { .. } | StoreError::InvalidKey { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Full catalog sorted by plan name. Empty descriptions are replaced
    /// with [`DEFAULT_PLAN_DESCRIPTION`]; stored records are never changed.
    pub async fn list_plans(&self) -> StoreResult<Vec<PlanSummary>> {
        let objects = bounded(
            self.timeout,
            self.store.list(ResourceKind::RpaasPlan, &self.namespace),
        )
        .await?;

        let mut plans = objects
            .into_iter()
            .map(|object| {
                let plan = Plan::try_from(object)?;
                let description = if plan.spec.description.is_empty() {
                    DEFAULT_PLAN_DESCRIPTION.to_string()
                } else {
                    plan.spec.description
                };
                Ok(PlanSummary {
                    name: plan.metadata.name,
                    description,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        plans.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(namespace = %self.namespace, count = plans.len(), "Listed plans");
        Ok(plans)
    }
}

use crate::core::bounded;
use crate::core::plans::PlanCatalog;
use crate::domain::model::{ObjectKey, ResourceKind, ServiceInstance};
use crate::domain::ports::ResourceStore;
use crate::utils::error::{ProvisionError, StoreError};
use crate::utils::validation::path_segment_problem;
use std::time::Duration;

/// Form fields of `POST /resources`. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateInstanceRequest {
    pub name: String,
    pub plan: String,
    pub team: String,
}

impl CreateInstanceRequest {
    pub fn new(
        name: impl Into<String>,
        plan: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            plan: plan.into(),
            team: team.into(),
        }
    }

    /// Builds a request from decoded form pairs. The first value of a
    /// repeated field wins and unknown fields are ignored.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut name = None;
        let mut plan = None;
        let mut team = None;
        for (key, value) in fields {
            let slot = match key.as_ref() {
                "name" => &mut name,
                "plan" => &mut plan,
                "team" => &mut team,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        Self {
            name: name.unwrap_or_default(),
            plan: plan.unwrap_or_default(),
            team: team.unwrap_or_default(),
        }
    }
}

fn require(value: &str, message: &str) -> Result<(), ProvisionError> {
    if value.is_empty() {
        return Err(ProvisionError::validation(message));
    }
    Ok(())
}

/// Instance names become store keys, so they must be a single path segment
/// on every backend.
fn check_name(name: &str) -> Result<(), ProvisionError> {
    match path_segment_problem(name) {
        Some(reason) => Err(ProvisionError::validation(format!(
            "invalid instance name: {reason}"
        ))),
        None => Ok(()),
    }
}

/// Validates provisioning requests and drives instance create/delete.
///
/// Holds no mutable state; concurrent requests are arbitrated by the
/// store's atomic create and delete.
#[derive(Debug, Clone)]
pub struct InstanceHandler<S: ResourceStore> {
    store: S,
    catalog: PlanCatalog<S>,
    namespace: String,
    timeout: Option<Duration>,
}

impl<S: ResourceStore + Clone> InstanceHandler<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            catalog: PlanCatalog::new(store.clone(), namespace.clone()),
            store,
            namespace,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.catalog = self.catalog.with_timeout(timeout);
        self.timeout = Some(timeout);
        self
    }
}

impl<S: ResourceStore> InstanceHandler<S> {
    pub fn catalog(&self) -> &PlanCatalog<S> {
        &self.catalog
    }

    fn key(&self, name: &str) -> ObjectKey {
        ObjectKey::new(ResourceKind::RpaasInstance, self.namespace.as_str(), name)
    }

    /// Checks run in order name, plan, team, plan validity, name shape,
    /// uniqueness; the first failure is returned and nothing is written.
    /// The whole request shares a single deadline.
    pub async fn create(&self, request: CreateInstanceRequest) -> Result<(), ProvisionError> {
        bounded(self.timeout, self.create_instance(request)).await
    }

    pub async fn delete(&self, name: &str) -> Result<(), ProvisionError> {
        bounded(self.timeout, self.delete_instance(name)).await
    }

    async fn create_instance(&self, request: CreateInstanceRequest) -> Result<(), ProvisionError> {
        let CreateInstanceRequest { name, plan, team } = request;

        require(&name, "name is required")?;
        require(&plan, "plan is required")?;
        require(&team, "team name is required")?;

        if self.catalog.find_plan(&plan).await?.is_none() {
            tracing::info!(instance = %name, plan = %plan, "Rejected instance with unknown plan");
            return Err(ProvisionError::validation("invalid plan"));
        }
        check_name(&name)?;

        let key = self.key(&name);
        match self.store.get(&key).await {
            Ok(_) => return Err(ProvisionError::conflict(name)),
            Err(StoreError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let object = ServiceInstance::new(
            name.as_str(),
            self.namespace.as_str(),
            plan.as_str(),
            team.as_str(),
        )
        .into_object()?;
        match self.store.create(object).await {
            Ok(()) => {
                tracing::info!(instance = %name, plan = %plan, team = %team, "Created instance");
                Ok(())
            }
            // lost a race with a concurrent create after the existence check
            Err(StoreError::AlreadyExists { .. }) => Err(ProvisionError::conflict(name)),
            Err(e) => {
                tracing::error!(instance = %name, error = %e, "Failed to create instance");
                Err(e.into())
            }
        }
    }

    async fn delete_instance(&self, name: &str) -> Result<(), ProvisionError> {
        require(name, "name is required")?;
        check_name(name)?;

        let key = self.key(name);
        match self.store.get(&key).await {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => return Err(ProvisionError::NotFound),
            Err(e) => return Err(e.into()),
        }

        match self.store.delete(&key).await {
            Ok(()) => {
                tracing::info!(instance = %name, "Deleted instance");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Err(ProvisionError::NotFound),
            Err(e) => {
                tracing::error!(instance = %name, error = %e, "Failed to delete instance");
                Err(e.into())
            }
        }
    }
}

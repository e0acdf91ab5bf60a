use crate::utils::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const API_VERSION: &str = "extensions.tsuru.io/v1alpha1";

/// Description shown for plans stored without one.
pub const DEFAULT_PLAN_DESCRIPTION: &str = "no plan description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    RpaasInstance,
    RpaasPlan,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::RpaasInstance => "RpaasInstance",
            ResourceKind::RpaasPlan => "RpaasPlan",
        }
    }

    /// 儲存目錄使用的複數小寫名稱
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::RpaasInstance => "rpaasinstances",
            ResourceKind::RpaasPlan => "rpaasplans",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            creation_timestamp: None,
        }
    }
}

/// The declarative record every store backend persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub api_version: String,
    pub kind: ResourceKind,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl StoredObject {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(
            self.kind,
            self.metadata.namespace.clone(),
            self.metadata.name.clone(),
        )
    }

    fn into_spec<T: serde::de::DeserializeOwned>(
        self,
        expected: ResourceKind,
    ) -> Result<(ObjectMeta, T), StoreError> {
        if self.kind != expected {
            return Err(StoreError::KindMismatch {
                expected,
                found: self.kind,
            });
        }
        let spec = match self.spec {
            serde_json::Value::Null => serde_json::from_value(serde_json::json!({}))?,
            spec => serde_json::from_value(spec)?,
        };
        Ok((self.metadata, spec))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    pub plan_name: String,
    #[serde(default)]
    pub team: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInstance {
    pub metadata: ObjectMeta,
    pub spec: InstanceSpec,
}

impl ServiceInstance {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        plan_name: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            spec: InstanceSpec {
                plan_name: plan_name.into(),
                team: team.into(),
            },
        }
    }

    pub fn into_object(self) -> Result<StoredObject, StoreError> {
        Ok(StoredObject {
            api_version: API_VERSION.to_string(),
            kind: ResourceKind::RpaasInstance,
            metadata: self.metadata,
            spec: serde_json::to_value(self.spec)?,
        })
    }
}

impl TryFrom<StoredObject> for ServiceInstance {
    type Error = StoreError;

    fn try_from(object: StoredObject) -> Result<Self, Self::Error> {
        let (metadata, spec) = object.into_spec(ResourceKind::RpaasInstance)?;
        Ok(Self { metadata, spec })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSpec {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub metadata: ObjectMeta,
    pub spec: PlanSpec,
}

impl Plan {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            spec: PlanSpec {
                description: description.into(),
            },
        }
    }

    pub fn into_object(self) -> Result<StoredObject, StoreError> {
        Ok(StoredObject {
            api_version: API_VERSION.to_string(),
            kind: ResourceKind::RpaasPlan,
            metadata: self.metadata,
            spec: serde_json::to_value(self.spec)?,
        })
    }
}

impl TryFrom<StoredObject> for Plan {
    type Error = StoreError;

    fn try_from(object: StoredObject) -> Result<Self, Self::Error> {
        let (metadata, spec) = object.into_spec(ResourceKind::RpaasPlan)?;
        Ok(Self { metadata, spec })
    }
}

/// Catalog entry as rendered by `GET /resources/plans`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlanSummary {
    pub name: String,
    pub description: String,
}

/// One host/port pair of an instance access control list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedUpstream {
    #[serde(default)]
    pub host: String,
    #[serde(default, skip_serializing_if = "is_unset_port")]
    pub port: u16,
}

fn is_unset_port(port: &u16) -> bool {
    *port == 0
}

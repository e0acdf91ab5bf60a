pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{acl_client::AclClient, file::FileStore, memory::MemoryStore};
pub use adapters::http::{build_router, ApiState};
pub use config::{ServerConfig, StoreBackend};
pub use core::{instances::InstanceHandler, plans::PlanCatalog};
pub use domain::ports::{AccessControlList, ResourceStore};
pub use utils::error::{ProvisionError, Result, RpaasError, StoreError};

// Adapters layer: concrete implementations for external systems (stores, http surface, REST clients).

pub mod acl_client;
pub mod file;
pub mod http;
pub mod memory;

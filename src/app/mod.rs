// Application layer: composition roots wiring config, adapters and core together.

pub mod acl;
pub mod server;

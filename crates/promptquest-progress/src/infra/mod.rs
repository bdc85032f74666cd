//! Persistence and remote sync backends

pub mod api_client;
pub mod kv_store;
pub mod remote;

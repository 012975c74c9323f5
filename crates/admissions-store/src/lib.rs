//! admissions-store: Data store integrations.
//!
//! Implements the `DataStore` trait for a hosted PostgREST backend (e.g.
//! Supabase) and for an in-memory store, and loads the configuration that
//! selects between them.

pub mod config;
pub mod memory;
pub mod rest;

pub use config::{create_store, load_config, AdmissionsConfig, ConfigError, StoreConfig};
pub use memory::MemoryStore;
pub use rest::RestStore;

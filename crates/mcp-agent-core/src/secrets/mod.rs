//! Secret lookup for startup configuration
//!
//! Credentials are read through the `SecretStore` trait so configuration
//! loading can be exercised without touching the process environment.

mod traits;
mod env_store;
mod memory_store;

pub use traits::SecretStore;
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;

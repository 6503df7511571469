//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `MovieStorage` - The collection's persistence contract (local or remote)
//! - `KeyValueStore` - Durable string storage under fixed keys
//!
//! ## Auth Ports
//!
//! - `AuthProvider` - Email/password auth with change notifications
//! - `AuthSubscription` / `AuthListeners` - Ordered, releasable change subscriptions

mod auth_provider;
mod auth_subscription;
mod key_value_store;
mod movie_storage;

pub use auth_provider::AuthProvider;
pub use auth_subscription::{AuthListeners, AuthSubscription};
pub use key_value_store::{KeyValueError, KeyValueStore};
pub use movie_storage::{MovieStorage, StorageError};

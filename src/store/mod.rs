/* src/store/mod.rs */

//!
//! Persistence boundary. The engine never persists anything itself; a
//! [`Persisted`](crate::provider::Persisted) provider delegates to a
//! [`Store`] keyed by an opaque string.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::MemoryStore;

/// Errors reported by a store backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
	/// The stored bytes could not be encoded or decoded.
	#[error("codec error: {0}")]
	Codec(String),
	/// The backend failed.
	#[error("backend error: {0}")]
	Backend(String),
}

/// Key-value persistence for fetched values.
#[async_trait]
pub trait Store<T>: Send + Sync
where
	T: Send + Sync + 'static,
{
	async fn get(&self, key: &str) -> Result<Option<T>, StoreError>;

	async fn set(&self, key: &str, value: &T) -> Result<(), StoreError>;

	/// Removes a value. Returns true if one was stored.
	async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T, S> Store<T> for Arc<S>
where
	T: Send + Sync + 'static,
	S: Store<T> + ?Sized,
{
	async fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
		(**self).get(key).await
	}

	async fn set(&self, key: &str, value: &T) -> Result<(), StoreError> {
		(**self).set(key, value).await
	}

	async fn remove(&self, key: &str) -> Result<bool, StoreError> {
		(**self).remove(key).await
	}
}

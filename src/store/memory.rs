/* src/store/memory.rs */

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, StoreError};

/// A simple in-memory store useful for testing and embedded environments.
#[derive(Debug)]
pub struct MemoryStore<T> {
	data: RwLock<HashMap<String, T>>,
}

impl<T> MemoryStore<T> {
	pub fn new() -> Self {
		Self {
			data: RwLock::new(HashMap::new()),
		}
	}

	pub async fn len(&self) -> usize {
		self.data.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.data.read().await.is_empty()
	}
}

impl<T> Default for MemoryStore<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl<T> Store<T> for MemoryStore<T>
where
	T: Clone + Send + Sync + 'static,
{
	async fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
		Ok(self.data.read().await.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &T) -> Result<(), StoreError> {
		self.data.write().await.insert(key.to_string(), value.clone());
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<bool, StoreError> {
		Ok(self.data.write().await.remove(key).is_some())
	}
}

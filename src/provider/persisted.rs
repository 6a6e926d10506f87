/* src/provider/persisted.rs */

use std::marker::PhantomData;

use async_trait::async_trait;

use super::Provider;
use crate::state::{Disposition, LoadError, Status};
use crate::store::Store;

/// Wraps a provider and mirrors its values into a [`Store`].
///
/// - The very first load (status `NotRequested`) is served from the store
///   when it holds a value for `key`.
/// - Every fetched value is written back; write failures are logged and do
///   not fail the fetch.
pub struct Persisted<P, S, T> {
	inner: P,
	store: S,
	key: String,
	_value: PhantomData<fn() -> T>,
}

impl<P, S, T> Persisted<P, S, T> {
	pub fn new(inner: P, store: S, key: impl Into<String>) -> Self {
		Self {
			inner,
			store,
			key: key.into(),
			_value: PhantomData,
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn store(&self) -> &S {
		&self.store
	}
}

#[async_trait]
impl<P, S, T> Provider<T> for Persisted<P, S, T>
where
	P: Provider<T>,
	S: Store<T>,
	T: Send + Sync + 'static,
{
	async fn load(&self) -> Result<T, LoadError> {
		let value = self.inner.load().await?;
		if let Err(e) = self.store.set(&self.key, &value).await {
			tracing::warn!(key = %self.key, error = %e, "failed to persist fetched value");
		}
		Ok(value)
	}

	async fn will_load(&self, previous: &Status<T>) -> Disposition<T> {
		if previous.is_not_requested() {
			match self.store.get(&self.key).await {
				Ok(Some(value)) => {
					tracing::trace!(key = %self.key, "serving stored value");
					return Disposition::provide_value(value);
				}
				Ok(None) => {}
				Err(e) => {
					tracing::warn!(key = %self.key, error = %e, "failed to read stored value");
				}
			}
		}
		self.inner.will_load(previous).await
	}

	async fn write(&self, value: T) -> Result<(), LoadError> {
		self.store
			.set(&self.key, &value)
			.await
			.map_err(LoadError::provider)
	}
}

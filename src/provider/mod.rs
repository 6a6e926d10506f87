/* src/provider/mod.rs */

//!
//! The fetch capability an [`Engine`](crate::engine::Engine) drives.
//!
//! - [`FnProvider`] - closure-backed fetch
//! - [`Fixed`] - constant value or error, never fetches
//! - [`MemoryProvider`] - in-memory value that is never refetched once present
//! - [`Persisted`] - wraps a provider and mirrors its values into a [`Store`](crate::store::Store)

mod fixed;
mod func;
mod memory;
mod persisted;

use std::sync::Arc;

use async_trait::async_trait;

use crate::state::{Disposition, LoadError, Status};

pub use fixed::Fixed;
pub use func::FnProvider;
pub use memory::MemoryProvider;
pub use persisted::Persisted;

/// Performs the actual data fetch.
///
/// Providers carry no engine-owned cancellation token: the engine races the
/// fetch against its own cancellation and discards late results.
#[async_trait]
pub trait Provider<T>: Send + Sync
where
	T: Send + Sync + 'static,
{
	/// Fetches the value.
	async fn load(&self) -> Result<T, LoadError>;

	/// Consulted before every fetch with the engine's current status.
	///
	/// Answer [`Disposition::Provide`] to adopt an outcome without fetching.
	async fn will_load(&self, _previous: &Status<T>) -> Disposition<T> {
		Disposition::Proceed
	}

	/// Stores a value through the provider, if it supports writing.
	async fn write(&self, _value: T) -> Result<(), LoadError> {
		Err(LoadError::OperationNotSupported("write"))
	}
}

#[async_trait]
impl<T, P> Provider<T> for Arc<P>
where
	T: Send + Sync + 'static,
	P: Provider<T> + ?Sized,
{
	async fn load(&self) -> Result<T, LoadError> {
		(**self).load().await
	}

	async fn will_load(&self, previous: &Status<T>) -> Disposition<T> {
		(**self).will_load(previous).await
	}

	async fn write(&self, value: T) -> Result<(), LoadError> {
		(**self).write(value).await
	}
}

#[async_trait]
impl<T, P> Provider<T> for Box<P>
where
	T: Send + Sync + 'static,
	P: Provider<T> + ?Sized,
{
	async fn load(&self) -> Result<T, LoadError> {
		(**self).load().await
	}

	async fn will_load(&self, previous: &Status<T>) -> Disposition<T> {
		(**self).will_load(previous).await
	}

	async fn write(&self, value: T) -> Result<(), LoadError> {
		(**self).write(value).await
	}
}

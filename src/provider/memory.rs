/* src/provider/memory.rs */

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;

use super::Provider;
use crate::state::{Disposition, LoadError, Status};

/// An in-memory value source.
///
/// Once the engine holds a value this provider never refetches; it hands
/// the current value back through [`Disposition::Provide`]. Supports
/// [`write`](Provider::write).
#[derive(Debug)]
pub struct MemoryProvider<T> {
	value: ArcSwapOption<T>,
}

impl<T> MemoryProvider<T> {
	/// Creates an empty provider. Loading it fails until a value is written.
	pub fn new() -> Self {
		Self {
			value: ArcSwapOption::empty(),
		}
	}

	pub fn with_value(value: T) -> Self {
		Self {
			value: ArcSwapOption::from_pointee(value),
		}
	}

	pub fn get(&self) -> Option<Arc<T>> {
		self.value.load_full()
	}
}

impl<T> Default for MemoryProvider<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl<T> Provider<T> for MemoryProvider<T>
where
	T: Clone + Send + Sync + 'static,
{
	async fn load(&self) -> Result<T, LoadError> {
		self.value
			.load_full()
			.map(|value| (*value).clone())
			.ok_or_else(|| LoadError::provider("memory provider holds no value"))
	}

	async fn will_load(&self, previous: &Status<T>) -> Disposition<T> {
		match previous.value() {
			Some(value) => Disposition::provide_value(value.clone()),
			None => Disposition::Proceed,
		}
	}

	async fn write(&self, value: T) -> Result<(), LoadError> {
		self.value.store(Some(Arc::new(value)));
		Ok(())
	}
}

/* src/provider/fixed.rs */

use async_trait::async_trait;

use super::Provider;
use crate::state::{Disposition, LoadError, Status};

/// A source that always yields the same outcome without fetching.
#[derive(Debug, Clone)]
pub enum Fixed<T> {
	Value(T),
	Error(LoadError),
}

impl<T: Clone> Fixed<T> {
	fn outcome(&self) -> Result<T, LoadError> {
		match self {
			Fixed::Value(value) => Ok(value.clone()),
			Fixed::Error(error) => Err(error.clone()),
		}
	}
}

#[async_trait]
impl<T> Provider<T> for Fixed<T>
where
	T: Clone + Send + Sync + 'static,
{
	async fn load(&self) -> Result<T, LoadError> {
		self.outcome()
	}

	async fn will_load(&self, _previous: &Status<T>) -> Disposition<T> {
		Disposition::Provide(self.outcome())
	}
}

/* src/state/disposition.rs */

use super::LoadError;

/// A provider's answer before the engine starts a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition<T> {
	/// Adopt this outcome without fetching.
	Provide(Result<T, LoadError>),
	/// Run the real fetch.
	Proceed,
}

impl<T> Disposition<T> {
	pub fn provide_value(value: T) -> Self {
		Disposition::Provide(Ok(value))
	}

	pub fn provide_error(error: LoadError) -> Self {
		Disposition::Provide(Err(error))
	}
}

/* src/state/error.rs */

use std::sync::Arc;

/// Boxed error returned by provider implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the engine and its coordination primitives.
///
/// `LoadError` is cheap to clone so that a single failure can be stored in a
/// [`Status`](super::Status) and fanned out to every waiting caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
	/// A capability was invoked on a provider that does not implement it.
	#[error("operation not supported: {0}")]
	OperationNotSupported(&'static str),
	/// The provider's fetch failed.
	#[error("provider failure: {0}")]
	Provider(Arc<dyn std::error::Error + Send + Sync>),
	/// The operation was cancelled before it produced a result.
	#[error("operation cancelled")]
	Cancelled,
}

impl LoadError {
	/// Wraps an arbitrary error as a provider failure.
	pub fn provider(error: impl Into<BoxError>) -> Self {
		Self::Provider(Arc::from(error.into()))
	}

	/// Returns true for [`LoadError::Cancelled`].
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

impl From<BoxError> for LoadError {
	fn from(error: BoxError) -> Self {
		Self::Provider(Arc::from(error))
	}
}

impl PartialEq for LoadError {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::OperationNotSupported(a), Self::OperationNotSupported(b)) => a == b,
			(Self::Provider(a), Self::Provider(b)) => {
				Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
			}
			(Self::Cancelled, Self::Cancelled) => true,
			_ => false,
		}
	}
}

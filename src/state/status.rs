/* src/state/status.rs */

use super::LoadError;

/// Snapshot of fetch progress owned by an [`Engine`](crate::engine::Engine).
///
/// Transitions only ever move forward from `NotRequested`:
///
/// ```text
/// NotRequested ──► Loading ──► Loaded | Failed
///                     ▲            │
///                     └────────────┘  (next refresh)
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status<T> {
	/// No fetch was ever attempted.
	#[default]
	NotRequested,
	/// A fetch is in flight; `last` keeps the previous value while reloading.
	Loading { last: Option<T> },
	/// The last fetch succeeded.
	Loaded(T),
	/// The last fetch failed.
	Failed(LoadError),
}

impl<T> Status<T> {
	/// Returns the payload of `Loaded` and of `Loading` with a retained value.
	pub fn value(&self) -> Option<&T> {
		match self {
			Status::Loaded(value) => Some(value),
			Status::Loading { last } => last.as_ref(),
			Status::NotRequested | Status::Failed(_) => None,
		}
	}

	/// Returns the error of a `Failed` status.
	pub fn error(&self) -> Option<&LoadError> {
		match self {
			Status::Failed(error) => Some(error),
			_ => None,
		}
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, Status::Loading { .. })
	}

	pub fn is_loaded(&self) -> bool {
		matches!(self, Status::Loaded(_))
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, Status::Failed(_))
	}

	pub fn is_not_requested(&self) -> bool {
		matches!(self, Status::NotRequested)
	}

	/// Converts a fetch outcome into the matching terminal status.
	pub fn from_result(result: Result<T, LoadError>) -> Self {
		match result {
			Ok(value) => Status::Loaded(value),
			Err(error) => Status::Failed(error),
		}
	}

	/// Short state name used in logs.
	pub fn name(&self) -> &'static str {
		match self {
			Status::NotRequested => "not_requested",
			Status::Loading { last: None } => "loading",
			Status::Loading { last: Some(_) } => "reloading",
			Status::Loaded(_) => "loaded",
			Status::Failed(_) => "failed",
		}
	}
}

impl<T: Clone> Status<T> {
	/// Builds the `Loading` status that follows this one.
	///
	/// With `reset_last` the previous value is discarded.
	pub fn to_loading(&self, reset_last: bool) -> Status<T> {
		let last = if reset_last {
			None
		} else {
			self.value().cloned()
		};
		Status::Loading { last }
	}
}

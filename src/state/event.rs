/* src/state/event.rs */

use super::Status;

/// Events broadcast by the engine to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
	/// A fetch completed successfully with a fresh value.
	Fetched(T),
	/// The engine's status changed.
	StatusUpdated(Status<T>),
}

impl<T> Event<T> {
	/// Returns the new status carried by a `StatusUpdated` event.
	pub fn status(&self) -> Option<&Status<T>> {
		match self {
			Event::StatusUpdated(status) => Some(status),
			Event::Fetched(_) => None,
		}
	}
}

/* src/state/request.rs */

use std::borrow::Cow;

/// Parameters of a single refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
	/// Diagnostic label, only used in logs.
	pub reason: Cow<'static, str>,
	/// Delay the fetch until the debounce interval elapses without a newer request.
	pub debounce: bool,
	/// Discard the current value instead of keeping it while loading.
	pub reset_last: bool,
}

impl RefreshRequest {
	/// An immediate refresh that keeps the current value while loading.
	pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
		Self {
			reason: reason.into(),
			debounce: false,
			reset_last: false,
		}
	}

	/// A debounced refresh that keeps the current value while loading.
	pub fn debounced(reason: impl Into<Cow<'static, str>>) -> Self {
		Self::new(reason).with_debounce(true)
	}

	pub fn with_debounce(mut self, debounce: bool) -> Self {
		self.debounce = debounce;
		self
	}

	pub fn with_reset_last(mut self, reset_last: bool) -> Self {
		self.reset_last = reset_last;
		self
	}
}

impl Default for RefreshRequest {
	fn default() -> Self {
		Self::new("manual")
	}
}

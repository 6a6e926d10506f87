/* src/signal/mod.rs */

//!
//! Contracts for the external signal sources that drive an engine.
//!
//! The engine never sees how signals are produced. A connectivity source is
//! started and then yields [`NetworkState`] changes; a lifecycle source yields
//! [`LifecycleEvent`]s. [`ManualConnectivity`] and [`ManualLifecycle`] are
//! in-process sources a host (or a test) can push notifications into.

mod manual;

use futures_util::stream::BoxStream;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use manual::{DEFAULT_SIGNAL_CAPACITY, ManualConnectivity, ManualLifecycle};

/// Network reachability reported by a connectivity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NetworkState {
	Unavailable,
	Wifi,
	Cellular,
}

impl NetworkState {
	pub fn is_connected(self) -> bool {
		!matches!(self, NetworkState::Unavailable)
	}
}

/// Application lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LifecycleEvent {
	/// The application returned to the foreground.
	EnteredForeground,
	/// The system clock or time zone changed significantly.
	SignificantTimeChange,
}

/// A source of network reachability changes.
pub trait Connectivity: Send + Sync {
	/// Begins monitoring. Called once before [`changes`](Connectivity::changes).
	fn start(&self);

	/// Stream of reachability changes from now on.
	fn changes(&self) -> BoxStream<'static, NetworkState>;
}

/// A source of application lifecycle notifications.
pub trait Lifecycle: Send + Sync {
	/// Stream of lifecycle notifications from now on.
	fn notifications(&self) -> BoxStream<'static, LifecycleEvent>;
}

impl<C: Connectivity + ?Sized> Connectivity for std::sync::Arc<C> {
	fn start(&self) {
		(**self).start();
	}

	fn changes(&self) -> BoxStream<'static, NetworkState> {
		(**self).changes()
	}
}

impl<L: Lifecycle + ?Sized> Lifecycle for std::sync::Arc<L> {
	fn notifications(&self) -> BoxStream<'static, LifecycleEvent> {
		(**self).notifications()
	}
}

impl<C: Connectivity + ?Sized> Connectivity for Box<C> {
	fn start(&self) {
		(**self).start();
	}

	fn changes(&self) -> BoxStream<'static, NetworkState> {
		(**self).changes()
	}
}

impl<L: Lifecycle + ?Sized> Lifecycle for Box<L> {
	fn notifications(&self) -> BoxStream<'static, LifecycleEvent> {
		(**self).notifications()
	}
}

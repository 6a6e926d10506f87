/* src/signal/manual.rs */

use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use futures_util::future;
use futures_util::stream::BoxStream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use super::{Connectivity, Lifecycle, LifecycleEvent, NetworkState};

/// Default notification channel capacity.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 16;

/// Turns a broadcast receiver into a stream, skipping over lag notices.
fn broadcast_stream<E: Clone + Send + 'static>(rx: broadcast::Receiver<E>) -> BoxStream<'static, E> {
	BroadcastStream::new(rx)
		.filter_map(|item| future::ready(item.ok()))
		.boxed()
}

/// Connectivity source fed by [`ManualConnectivity::set`].
#[derive(Debug)]
pub struct ManualConnectivity {
	tx: broadcast::Sender<NetworkState>,
	started: AtomicBool,
}

impl ManualConnectivity {
	pub fn new() -> Self {
		Self {
			tx: broadcast::channel(DEFAULT_SIGNAL_CAPACITY).0,
			started: AtomicBool::new(false),
		}
	}

	/// Publishes a reachability change. Returns how many listeners got it.
	pub fn set(&self, state: NetworkState) -> usize {
		self.tx.send(state).unwrap_or(0)
	}

	pub fn is_started(&self) -> bool {
		self.started.load(Ordering::Acquire)
	}
}

impl Default for ManualConnectivity {
	fn default() -> Self {
		Self::new()
	}
}

impl Connectivity for ManualConnectivity {
	fn start(&self) {
		self.started.store(true, Ordering::Release);
	}

	fn changes(&self) -> BoxStream<'static, NetworkState> {
		broadcast_stream(self.tx.subscribe())
	}
}

/// Lifecycle source fed by [`ManualLifecycle::notify`].
#[derive(Debug)]
pub struct ManualLifecycle {
	tx: broadcast::Sender<LifecycleEvent>,
}

impl ManualLifecycle {
	pub fn new() -> Self {
		Self {
			tx: broadcast::channel(DEFAULT_SIGNAL_CAPACITY).0,
		}
	}

	/// Publishes a lifecycle notification. Returns how many listeners got it.
	pub fn notify(&self, event: LifecycleEvent) -> usize {
		self.tx.send(event).unwrap_or(0)
	}
}

impl Default for ManualLifecycle {
	fn default() -> Self {
		Self::new()
	}
}

impl Lifecycle for ManualLifecycle {
	fn notifications(&self) -> BoxStream<'static, LifecycleEvent> {
		broadcast_stream(self.tx.subscribe())
	}
}

/* src/engine/watch.rs */

//!
//! Adapters that turn timer ticks and external signals into refreshes.
//!
//! Every adapter runs as its own task holding only a weak reference to the
//! engine, and is registered in the engine's signal bag so that
//! [`Engine::cancel`] stops it.

use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::time::{Instant, MissedTickBehavior};

use super::Engine;
use super::handle::Shared;
use crate::signal::{Connectivity, Lifecycle, LifecycleEvent, NetworkState};
use crate::state::RefreshRequest;

const TIMER_TAG: &str = "timer";
const CONNECTIVITY_TAG: &str = "connectivity";
const LIFECYCLE_TAG: &str = "lifecycle";

impl<T> Engine<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Starts the periodic refresh timer when `refresh_interval` is set.
	///
	/// Returns false when no interval is configured.
	pub fn start_timer(&self) -> bool {
		let Some(period) = self.shared.config.refresh_interval else {
			return false;
		};

		let weak = Arc::downgrade(&self.shared);
		let handle = tokio::spawn(timer_loop(weak, period));
		self.shared.signals.insert_tagged(TIMER_TAG, handle.abort_handle());
		engine_log!(self.shared.config, period_ms = period.as_millis() as u64, "refresh timer started");
		true
	}

	/// Starts `source` and refreshes (debounced) whenever it reports a
	/// transition into a connected state while the engine is failed.
	///
	/// The source is kept alive for as long as the adapter runs.
	pub fn watch_connectivity<C>(&self, source: C)
	where
		C: Connectivity + 'static,
	{
		source.start();
		let changes = source.changes();
		let weak = Arc::downgrade(&self.shared);
		let handle = tokio::spawn(connectivity_loop(weak, source, changes));
		self.shared
			.signals
			.insert_tagged(CONNECTIVITY_TAG, handle.abort_handle());
		engine_log!(self.shared.config, "connectivity adapter attached");
	}

	/// Refreshes (debounced) on every foreground or time-change notification.
	///
	/// The source is kept alive for as long as the adapter runs.
	pub fn watch_lifecycle<L>(&self, source: L)
	where
		L: Lifecycle + 'static,
	{
		let notifications = source.notifications();
		let weak = Arc::downgrade(&self.shared);
		let handle = tokio::spawn(lifecycle_loop(weak, source, notifications));
		self.shared
			.signals
			.insert_tagged(LIFECYCLE_TAG, handle.abort_handle());
		engine_log!(self.shared.config, "lifecycle adapter attached");
	}
}

async fn timer_loop<T>(weak: Weak<Shared<T>>, period: Duration)
where
	T: Clone + Send + Sync + 'static,
{
	let mut interval = tokio::time::interval_at(Instant::now() + period, period);
	interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		interval.tick().await;
		let Some(shared) = weak.upgrade() else {
			break;
		};
		if shared.status().is_loading() {
			continue;
		}
		if let Err(e) = shared.refresh(RefreshRequest::debounced("timer")).await {
			engine_log!(shared.config, error = %e, "timer refresh failed");
		}
	}
}

async fn connectivity_loop<T, C>(
	weak: Weak<Shared<T>>,
	_source: C,
	mut changes: BoxStream<'static, NetworkState>,
) where
	T: Clone + Send + Sync + 'static,
	C: Connectivity,
{
	let mut last = None;

	while let Some(state) = changes.next().await {
		if last == Some(state) {
			continue;
		}
		last = Some(state);

		let Some(shared) = weak.upgrade() else {
			break;
		};
		engine_log!(shared.config, state = ?state, "connectivity changed");
		if !state.is_connected() || !shared.status().is_failed() {
			continue;
		}
		if let Err(e) = shared.refresh(RefreshRequest::debounced("connectivity")).await {
			engine_log!(shared.config, error = %e, "connectivity refresh failed");
		}
	}
}

async fn lifecycle_loop<T, L>(
	weak: Weak<Shared<T>>,
	_source: L,
	mut notifications: BoxStream<'static, LifecycleEvent>,
) where
	T: Clone + Send + Sync + 'static,
	L: Lifecycle,
{
	while let Some(event) = notifications.next().await {
		let Some(shared) = weak.upgrade() else {
			break;
		};
		let reason = match event {
			LifecycleEvent::EnteredForeground => "foreground",
			LifecycleEvent::SignificantTimeChange => "time_change",
		};
		if let Err(e) = shared.refresh(RefreshRequest::debounced(reason)).await {
			engine_log!(shared.config, error = %e, "lifecycle refresh failed");
		}
	}
}

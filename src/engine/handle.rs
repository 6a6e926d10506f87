/* src/engine/handle.rs */

use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;

use super::Config;
use crate::bus::{Bus, Subscription};
use crate::provider::Provider;
use crate::state::{Event, LoadError, Status};
use crate::sync::{CancelBag, Debouncer, lock};

pub(crate) type ProviderRef<T> = Box<dyn Provider<T>>;

/// Mutable engine state. Every mutation happens under one lock so status
/// transitions are totally ordered.
pub(crate) struct State<T> {
	pub(crate) status: Status<T>,
	/// Bumped whenever something takes over the status; a fetch only adopts
	/// its outcome while its generation is still current.
	pub(crate) generation: u64,
	/// Status from before an optimistic debounced `Loading`, restored if the
	/// engine is torn down before the debounce fires.
	pub(crate) parked: Option<Status<T>>,
}

pub(crate) struct Shared<T> {
	pub(crate) config: Config,
	pub(crate) provider: ArcSwap<ProviderRef<T>>,
	pub(crate) state: Mutex<State<T>>,
	/// Handle of the active fetch.
	pub(crate) fetches: CancelBag,
	/// Timer and signal adapter registrations.
	pub(crate) signals: CancelBag,
	pub(crate) debouncer: Debouncer,
	pub(crate) bus: Bus<Event<T>>,
}

impl<T> Shared<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub(crate) fn lock(&self) -> MutexGuard<'_, State<T>> {
		lock(&self.state)
	}

	pub(crate) fn status(&self) -> Status<T> {
		self.lock().status.clone()
	}

	/// Replaces the status and announces it. Callers hold the state lock.
	pub(crate) fn publish(&self, state: &mut State<T>, status: Status<T>) {
		engine_log!(self.config, status = status.name(), "status updated");
		state.status = status.clone();
		self.bus.send(Event::StatusUpdated(status));
	}
}

impl<T> Drop for Shared<T> {
	fn drop(&mut self) {
		self.fetches.cancel_all();
		self.signals.cancel_all();
		self.debouncer.cancel();
		self.bus.finish();
	}
}

/// Handle to a load engine.
///
/// Cloning is cheap; every clone drives the same engine. The engine tears
/// itself down (cancelling its fetch, timer and signal adapters, and
/// finishing its event bus) once the last handle is dropped.
///
/// Methods that start background work must be called from within a tokio
/// runtime.
pub struct Engine<T> {
	pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for Engine<T> {
	fn clone(&self) -> Self {
		Self {
			shared: Arc::clone(&self.shared),
		}
	}
}

impl<T> Engine<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Creates an engine around `provider` and starts its refresh timer if
	/// one is configured.
	pub fn new(provider: impl Provider<T> + 'static, config: Config) -> Self {
		let engine = Self::from_parts(Box::new(provider), config);
		engine.start_timer();
		engine
	}

	pub fn builder() -> super::EngineBuilder<T> {
		super::EngineBuilder::new()
	}

	pub(crate) fn from_parts(provider: ProviderRef<T>, config: Config) -> Self {
		Self {
			shared: Arc::new(Shared {
				config,
				provider: ArcSwap::from_pointee(provider),
				state: Mutex::new(State {
					status: Status::NotRequested,
					generation: 0,
					parked: None,
				}),
				fetches: CancelBag::new(),
				signals: CancelBag::new(),
				debouncer: Debouncer::new(),
				bus: Bus::new(),
			}),
		}
	}

	/// Returns a snapshot of the current status.
	pub fn status(&self) -> Status<T> {
		self.shared.status()
	}

	/// Returns the current value, including one retained while reloading.
	pub fn value(&self) -> Option<T> {
		self.shared.lock().status.value().cloned()
	}

	/// Returns the error of a failed status.
	pub fn error(&self) -> Option<LoadError> {
		self.shared.lock().status.error().cloned()
	}

	pub fn is_loading(&self) -> bool {
		self.shared.lock().status.is_loading()
	}

	/// Opens an event subscription. Only events sent from now on are seen.
	pub fn subscribe(&self) -> Subscription<Event<T>> {
		self.shared.bus.subscribe()
	}

	/// Number of subscriptions still being consumed.
	pub fn subscriber_count(&self) -> usize {
		self.shared.bus.subscriber_count()
	}

	pub fn config(&self) -> &Config {
		&self.shared.config
	}
}

impl<T> std::fmt::Debug for Engine<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let status = lock(&self.shared.state).status.name();
		f.debug_struct("Engine")
			.field("label", &self.shared.config.label)
			.field("status", &status)
			.field("bus", &self.shared.bus)
			.finish_non_exhaustive()
	}
}

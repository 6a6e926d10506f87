/* src/engine/refresh.rs */

//!
//! Refresh entry points and the single-flight fetch path.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::Engine;
use super::handle::{ProviderRef, Shared, State};
use crate::provider::{Fixed, Provider};
use crate::state::{Disposition, Event, LoadError, RefreshRequest, Status};

const FETCH_TAG: &str = "fetch";

impl<T> Shared<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Runs one fetch under single-flight discipline and returns its outcome.
	pub(crate) async fn execute(self: &Arc<Self>, request: &RefreshRequest) -> Result<T, LoadError> {
		let provider = self.provider.load_full();

		// The token is live before the pre-fetch hook runs, so a teardown or a
		// newer fetch landing while the hook is pending still reaches it.
		let token = CancellationToken::new();
		let (epoch, previous, id) = {
			let state = self.lock();
			// Starting a fetch always cancels the one before it.
			self.fetches.cancel_all();
			let id = self.fetches.insert_tagged(FETCH_TAG, token.clone());
			(state.generation, state.status.clone(), id)
		};

		let disposition = provider.will_load(&previous).await;

		let (generation, last) = {
			let mut state = self.lock();
			if token.is_cancelled() || state.generation != epoch {
				drop(state);
				self.fetches.remove(id);
				engine_log!(self.config, reason = %request.reason, "fetch superseded before it started");
				return previous
					.to_loading(request.reset_last)
					.value()
					.cloned()
					.ok_or(LoadError::Cancelled);
			}

			if let Disposition::Provide(result) = disposition {
				engine_log!(self.config, reason = %request.reason, "provider answered without fetching");
				state.generation += 1;
				state.parked = None;
				self.publish(&mut state, Status::from_result(result.clone()));
				drop(state);
				self.fetches.remove(id);
				return result;
			}

			state.generation += 1;
			state.parked = None;
			let loading = state.status.to_loading(request.reset_last);
			let last = loading.value().cloned();
			self.publish(&mut state, loading);
			let generation = state.generation;
			drop(state);
			(generation, last)
		};

		engine_log!(self.config, reason = %request.reason, generation, "fetch started");

		let task_token = token.clone();
		let handle = tokio::spawn(async move {
			if task_token.is_cancelled() {
				return Err(LoadError::Cancelled);
			}
			let result = provider.load().await;
			if task_token.is_cancelled() {
				return Err(LoadError::Cancelled);
			}
			result
		});

		// A fetch past its last checkpoint keeps running in the background;
		// the engine simply stops waiting for it.
		let outcome = tokio::select! {
			biased;
			joined = handle => joined.unwrap_or_else(|e| {
				if e.is_cancelled() {
					Err(LoadError::Cancelled)
				} else {
					Err(LoadError::provider(format!("fetch task failed: {e}")))
				}
			}),
			_ = token.cancelled() => Err(LoadError::Cancelled),
		};

		self.fetches.remove(id);
		let mut state = self.lock();
		self.complete(&mut state, generation, last, outcome)
	}

	fn complete(
		&self,
		state: &mut State<T>,
		generation: u64,
		last: Option<T>,
		outcome: Result<T, LoadError>,
	) -> Result<T, LoadError> {
		let current = state.generation == generation;

		match outcome {
			Ok(value) => {
				if current {
					engine_log!(self.config, generation, "fetch succeeded");
					state.status = Status::Loaded(value.clone());
					self.bus.send(Event::Fetched(value.clone()));
					self.publish(state, Status::Loaded(value.clone()));
				}
				Ok(value)
			}
			Err(LoadError::Cancelled) => match last {
				Some(previous) => {
					if current {
						engine_log!(self.config, generation, "fetch cancelled, rolling back");
						self.publish(state, Status::Loaded(previous.clone()));
					}
					Ok(previous)
				}
				None => {
					if current {
						engine_log!(self.config, generation, "fetch cancelled without history");
						self.publish(state, Status::Failed(LoadError::Cancelled));
					}
					Err(LoadError::Cancelled)
				}
			},
			Err(error) => {
				if current {
					tracing::warn!(label = %self.config.label, error = %error, "fetch failed");
					self.publish(state, Status::Failed(error.clone()));
				}
				Err(error)
			}
		}
	}

	/// Routes a refresh request to the immediate or debounced path.
	pub(crate) async fn refresh(self: &Arc<Self>, request: RefreshRequest) -> Result<(), LoadError> {
		if !request.debounce {
			self.debouncer.cancel();
			self.spawn_execute(request);
			return Ok(());
		}

		// Nothing to protect yet, so there is no reason to wait.
		if self.status().is_not_requested() {
			return self.execute(&request).await.map(drop);
		}

		self.arm_debounce(request);
		Ok(())
	}

	/// Fire-and-forget fetch. Failures only surface through status and events.
	fn spawn_execute(self: &Arc<Self>, request: RefreshRequest) {
		let shared = Arc::clone(self);
		tokio::spawn(async move {
			if let Err(e) = shared.execute(&request).await {
				engine_log!(shared.config, reason = %request.reason, error = %e, "refresh failed");
			}
		});
	}

	fn arm_debounce(self: &Arc<Self>, request: RefreshRequest) {
		{
			let mut state = self.lock();
			self.fetches.cancel_all();
			state.generation += 1;
			if state.parked.is_none() {
				state.parked = Some(settled(&state.status));
			}
			let loading = state.status.to_loading(request.reset_last);
			self.publish(&mut state, loading);
		}

		engine_log!(
			self.config,
			reason = %request.reason,
			delay_ms = self.config.debounce_interval.as_millis() as u64,
			"refresh debounced"
		);

		let weak = Arc::downgrade(self);
		self.debouncer.schedule(self.config.debounce_interval, async move {
			let Some(shared) = weak.upgrade() else {
				return;
			};
			if let Err(e) = shared.execute(&request).await {
				engine_log!(shared.config, reason = %request.reason, error = %e, "debounced refresh failed");
			}
		});
	}

	pub(crate) fn set_data(&self, value: T) {
		let mut state = self.lock();
		self.fetches.cancel_all();
		// The injected value replaces whatever a pending debounce parked.
		let _pending = self.debouncer.cancel();
		state.generation += 1;
		state.parked = None;
		self.publish(&mut state, Status::Loaded(value));
	}

	/// Cancels the active fetch, the timer and signal registrations, and the
	/// pending debounce, in that order.
	pub(crate) fn cancel(&self) {
		let fetches = self.fetches.cancel_all();
		let signals = self.signals.cancel_all();
		let debounced = self.debouncer.cancel();

		// A status is still parked while the debounced fetch is either waiting
		// or stuck in its pre-fetch hook; neither will publish anymore.
		let mut state = self.lock();
		let parked = state.parked.take();
		if let Some(parked) = parked
			&& state.status.is_loading()
		{
			state.generation += 1;
			self.publish(&mut state, parked);
		}
		drop(state);

		engine_log!(self.config, fetches, signals, debounced, "engine cancelled");
	}
}

/// The terminal status a `Loading` status stands in for.
fn settled<T: Clone>(status: &Status<T>) -> Status<T> {
	match status {
		Status::Loading { last: Some(value) } => Status::Loaded(value.clone()),
		Status::Loading { last: None } => Status::Failed(LoadError::Cancelled),
		other => other.clone(),
	}
}

impl<T> Engine<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Requests a refresh.
	///
	/// - Immediate (`debounce == false`): cancels any pending debounce and
	///   starts a fetch in the background. Returns `Ok(())` right away; a
	///   failing fetch is only visible through [`status`](Engine::status)
	///   and events.
	/// - Debounced, first load: fetches immediately and returns its error.
	/// - Debounced otherwise: cancels the running fetch, switches to
	///   `Loading` and fetches once `debounce_interval` passes without a
	///   newer debounced request.
	pub async fn refresh(&self, request: RefreshRequest) -> Result<(), LoadError> {
		self.shared.refresh(request).await
	}

	/// Fetches now and waits for the outcome.
	pub async fn load(&self) -> Result<T, LoadError> {
		self.shared.execute(&RefreshRequest::new("load")).await
	}

	/// Lazy trigger for the first observation of the engine.
	///
	/// Does nothing while loading or after a failure; otherwise fetches and
	/// waits, swallowing any error.
	pub async fn on_task(&self) {
		let status = self.status();
		if status.is_loading() || status.is_failed() {
			return;
		}
		let request = RefreshRequest::new("task");
		if let Err(e) = self.shared.execute(&request).await {
			engine_log!(self.shared.config, error = %e, "task load failed");
		}
	}

	/// Swaps the provider, then refreshes under `request`.
	///
	/// An immediate request is awaited and its error returned; a debounced
	/// one follows [`refresh`](Engine::refresh).
	pub async fn update_source(
		&self,
		provider: impl Provider<T> + 'static,
		request: RefreshRequest,
	) -> Result<(), LoadError> {
		let provider: ProviderRef<T> = Box::new(provider);
		self.shared.provider.store(Arc::new(provider));
		engine_log!(self.shared.config, reason = %request.reason, "provider swapped");

		if request.debounce {
			self.shared.refresh(request).await
		} else {
			self.shared.execute(&request).await.map(drop)
		}
	}

	/// Replaces the source with a constant value.
	pub async fn update_value(&self, value: T, request: RefreshRequest) -> Result<(), LoadError> {
		self.update_source(Fixed::Value(value), request).await
	}

	/// Replaces the source with a constant error.
	pub async fn update_error(
		&self,
		error: LoadError,
		request: RefreshRequest,
	) -> Result<(), LoadError> {
		self.update_source(Fixed::<T>::Error(error), request).await
	}

	/// Injects a value directly, bypassing the provider. Any running fetch
	/// or pending debounce is superseded.
	pub fn set_data(&self, value: T) {
		self.shared.set_data(value);
	}

	/// Writes `value` through the provider, then injects it like
	/// [`set_data`](Engine::set_data).
	pub async fn write(&self, value: T) -> Result<(), LoadError> {
		let provider = self.shared.provider.load_full();
		provider.write(value.clone()).await?;
		self.shared.set_data(value);
		Ok(())
	}

	/// Tears down background work: the active fetch (rolling back to the
	/// previous value when there is one), the timer and signal adapters, and
	/// the pending debounce. Idempotent.
	///
	/// Status left at an optimistic debounced `Loading` is restored to what
	/// it was before the debounce.
	pub fn cancel(&self) {
		self.shared.cancel();
	}

	/// [`cancel`](Engine::cancel), then terminates every event subscription.
	pub fn shutdown(&self) {
		self.shared.cancel();
		self.shared.bus.finish();
	}
}

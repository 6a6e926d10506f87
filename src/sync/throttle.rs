/* src/sync/throttle.rs */

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use super::lock;
use crate::state::LoadError;

type Op<T> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, LoadError>> + Send>;
type Waiter<T> = oneshot::Sender<Result<T, LoadError>>;

/// One merge window: every caller that joined it, and the op that will run.
struct Batch<T> {
	id: u64,
	op: Option<Op<T>>,
	waiters: Vec<Waiter<T>>,
	deadline: Instant,
	task: Option<AbortHandle>,
}

impl<T: Clone> Batch<T> {
	fn resolve(self, result: Result<T, LoadError>) {
		if let Some(task) = &self.task {
			task.abort();
		}
		for waiter in self.waiters {
			let _ = waiter.send(result.clone());
		}
	}
}

/// Per-key state: the window still collecting callers and the windows executing.
struct Slot<T> {
	pending: Option<Batch<T>>,
	running: Vec<Batch<T>>,
}

impl<T> Default for Slot<T> {
	fn default() -> Self {
		Self {
			pending: None,
			running: Vec::new(),
		}
	}
}

impl<T> Slot<T> {
	fn is_idle(&self) -> bool {
		self.pending.is_none() && self.running.is_empty()
	}
}

type Slots<K, T> = Arc<Mutex<HashMap<K, Slot<T>>>>;

/// Key-scoped coalescing throttler.
///
/// All calls for one key that arrive within a sliding window of `interval`
/// are merged into a single execution. The most recently supplied op is the
/// one that runs, and its result (success or error) is handed to every
/// merged caller. Each key has its own window and background worker; keys
/// never wait on each other.
pub struct Throttler<K, T> {
	slots: Slots<K, T>,
	next_id: AtomicU64,
}

impl<K, T> Throttler<K, T>
where
	K: Eq + Hash + Clone + Send + 'static,
	T: Clone + Send + 'static,
{
	pub fn new() -> Self {
		Self {
			slots: Arc::new(Mutex::new(HashMap::new())),
			next_id: AtomicU64::new(0),
		}
	}

	/// Joins (or opens) the merge window for `key` and waits for its result.
	///
	/// Every call pushes the window's deadline to `now + interval` and
	/// replaces the op that will run. Resolves with
	/// [`LoadError::Cancelled`] if the key is cancelled first.
	pub async fn schedule<F, Fut>(&self, key: K, interval: Duration, op: F) -> Result<T, LoadError>
	where
		F: FnOnce() -> Fut + Send + 'static,
		Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
	{
		let (tx, rx) = oneshot::channel();
		let op: Op<T> = Box::new(move || op().boxed());
		let deadline = Instant::now() + interval;

		{
			let mut slots = lock(&self.slots);
			let slot = slots.entry(key.clone()).or_default();
			match slot.pending.as_mut() {
				Some(batch) => {
					batch.op = Some(op);
					batch.waiters.push(tx);
					batch.deadline = deadline;
				}
				None => {
					let id = self.next_id.fetch_add(1, Ordering::Relaxed);
					let handle = tokio::spawn(run_window(Arc::clone(&self.slots), key, id));
					slot.pending = Some(Batch {
						id,
						op: Some(op),
						waiters: vec![tx],
						deadline,
						task: Some(handle.abort_handle()),
					});
				}
			}
		}

		rx.await.unwrap_or(Err(LoadError::Cancelled))
	}

	/// Aborts the pending and executing windows of `key`.
	///
	/// Every caller waiting on that key has been resolved with
	/// [`LoadError::Cancelled`] when this returns.
	pub fn cancel(&self, key: &K) -> bool {
		let slot = lock(&self.slots).remove(key);
		match slot {
			Some(slot) => {
				cancel_slot(slot);
				true
			}
			None => false,
		}
	}

	/// Cancels every key.
	pub fn cancel_all(&self) {
		let slots: Vec<Slot<T>> = lock(&self.slots).drain().map(|(_, slot)| slot).collect();
		for slot in slots {
			cancel_slot(slot);
		}
	}

	/// Returns true if `key` has a pending or executing window.
	pub fn is_active(&self, key: &K) -> bool {
		lock(&self.slots).contains_key(key)
	}

	/// Number of keys with a pending or executing window.
	pub fn active_keys(&self) -> usize {
		lock(&self.slots).len()
	}
}

fn cancel_slot<T: Clone>(slot: Slot<T>) {
	if let Some(batch) = slot.pending {
		batch.resolve(Err(LoadError::Cancelled));
	}
	for batch in slot.running {
		batch.resolve(Err(LoadError::Cancelled));
	}
}

/// Background worker for one window: waits out the sliding deadline, runs
/// the latest op and fans its result out.
async fn run_window<K, T>(slots: Slots<K, T>, key: K, id: u64)
where
	K: Eq + Hash + Clone + Send + 'static,
	T: Clone + Send + 'static,
{
	loop {
		let deadline = {
			let guard = lock(&slots);
			match guard
				.get(&key)
				.and_then(|slot| slot.pending.as_ref())
				.filter(|batch| batch.id == id)
			{
				Some(batch) => batch.deadline,
				None => return,
			}
		};

		if Instant::now() < deadline {
			tokio::time::sleep_until(deadline).await;
			continue;
		}

		let op = {
			let mut guard = lock(&slots);
			let Some(slot) = guard.get_mut(&key) else {
				return;
			};
			if slot.pending.as_ref().map(|batch| batch.id) != Some(id) {
				return;
			}
			let Some(mut batch) = slot.pending.take() else {
				return;
			};
			let op = batch.op.take();
			slot.running.push(batch);
			op
		};

		let result = match op {
			Some(op) => AssertUnwindSafe(async move { op().await })
				.catch_unwind()
				.await
				.unwrap_or_else(|_| Err(LoadError::provider("throttled operation panicked"))),
			None => Err(LoadError::Cancelled),
		};

		let batch = {
			let mut guard = lock(&slots);
			let Some(slot) = guard.get_mut(&key) else {
				return;
			};
			let batch = slot
				.running
				.iter()
				.position(|batch| batch.id == id)
				.map(|index| slot.running.swap_remove(index));
			if slot.is_idle() {
				guard.remove(&key);
			}
			batch
		};

		if let Some(mut batch) = batch {
			// The worker must not abort itself while resolving.
			batch.task = None;
			batch.resolve(result);
		}
		return;
	}
}

impl<K, T> Default for Throttler<K, T>
where
	K: Eq + Hash + Clone + Send + 'static,
	T: Clone + Send + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

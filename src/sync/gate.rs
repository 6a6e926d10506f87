/* src/sync/gate.rs */

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::task::AbortHandle;

use super::lock;
use crate::state::LoadError;

type SharedResult<T> = Shared<BoxFuture<'static, Result<T, LoadError>>>;

struct Active<T> {
	id: u64,
	result: SharedResult<T>,
	abort: AbortHandle,
}

/// Mutual-exclusion gate for a single operation.
///
/// While an execution is outstanding, further [`perform`](Gate::perform)
/// calls do not start a new one; they await and return the same result.
/// There is no merge window: once the execution finishes, the next call
/// starts a fresh one.
pub struct Gate<T> {
	active: Arc<Mutex<Option<Active<T>>>>,
	next_id: AtomicU64,
}

impl<T> Gate<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self {
			active: Arc::new(Mutex::new(None)),
			next_id: AtomicU64::new(0),
		}
	}

	/// Runs `op` unless an execution is already active, in which case the
	/// caller joins it. `op` is only invoked when a new execution starts.
	pub async fn perform<F, Fut>(&self, op: F) -> Result<T, LoadError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
	{
		let result = {
			let mut active = lock(&self.active);
			match active.as_ref() {
				Some(current) => current.result.clone(),
				None => {
					let id = self.next_id.fetch_add(1, Ordering::Relaxed);
					let (result, abort) = self.start(id, op());
					*active = Some(Active {
						id,
						result: result.clone(),
						abort,
					});
					result
				}
			}
		};

		result.await
	}

	fn start<Fut>(&self, id: u64, fut: Fut) -> (SharedResult<T>, AbortHandle)
	where
		Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
	{
		let release = Release {
			slot: Arc::clone(&self.active),
			id,
		};
		let handle = tokio::spawn(async move {
			// Dropped on completion, panic or abort alike.
			let _release = release;
			fut.await
		});
		let abort = handle.abort_handle();

		let result = async move {
			match handle.await {
				Ok(result) => result,
				Err(e) if e.is_panic() => Err(LoadError::provider("gated operation panicked")),
				Err(_) => Err(LoadError::Cancelled),
			}
		}
		.boxed()
		.shared();

		(result, abort)
	}

	/// Cancels the active execution. Every caller waiting on it receives
	/// [`LoadError::Cancelled`].
	pub fn cancel(&self) -> bool {
		let active = lock(&self.active).take();
		match active {
			Some(active) => {
				active.abort.abort();
				true
			}
			None => false,
		}
	}

	/// Returns true while an execution is outstanding.
	pub fn is_active(&self) -> bool {
		lock(&self.active).is_some()
	}
}

/// Clears the active slot when its execution ends, unless a newer one took it.
struct Release<T> {
	slot: Arc<Mutex<Option<Active<T>>>>,
	id: u64,
}

impl<T> Drop for Release<T> {
	fn drop(&mut self) {
		let mut active = lock(&self.slot);
		if active.as_ref().is_some_and(|current| current.id == self.id) {
			*active = None;
		}
	}
}

impl<T> Default for Gate<T>
where
	T: Clone + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Drop for Gate<T> {
	fn drop(&mut self) {
		if let Some(active) = lock(&self.active).take() {
			active.abort.abort();
		}
	}
}

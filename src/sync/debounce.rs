/* src/sync/debounce.rs */

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::lock;

struct Pending {
	id: u64,
	token: CancellationToken,
}

/// Holds at most one pending delayed operation.
///
/// Scheduling a new operation cancels the one still waiting, so after any
/// number of concurrent [`schedule`](Debouncer::schedule) calls exactly the
/// most recent one remains armed. Once an operation has fired it runs to
/// completion; `cancel` only affects operations that are still waiting.
///
/// Must be used from within a tokio runtime.
#[derive(Default)]
pub struct Debouncer {
	slot: Arc<Mutex<Option<Pending>>>,
	next_id: AtomicU64,
}

impl Debouncer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Arms `op` to run after `after`, replacing any pending operation.
	pub fn schedule<F>(&self, after: Duration, op: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let token = CancellationToken::new();

		let previous = lock(&self.slot).replace(Pending {
			id,
			token: token.clone(),
		});
		if let Some(previous) = previous {
			previous.token.cancel();
		}

		let slot = Arc::clone(&self.slot);
		tokio::spawn(async move {
			tokio::select! {
				_ = token.cancelled() => return,
				_ = tokio::time::sleep(after) => {}
			}

			// A newer schedule or a cancel may have raced the timer.
			let fired = {
				let mut slot = lock(&slot);
				if slot.as_ref().is_some_and(|pending| pending.id == id) {
					slot.take();
					true
				} else {
					false
				}
			};

			if fired {
				op.await;
			}
		});
	}

	/// Cancels the pending operation, if any. Returns true if one was waiting.
	pub fn cancel(&self) -> bool {
		let pending = lock(&self.slot).take();
		match pending {
			Some(pending) => {
				pending.token.cancel();
				true
			}
			None => false,
		}
	}

	/// Returns true while an operation is armed and has not fired yet.
	pub fn is_pending(&self) -> bool {
		lock(&self.slot).is_some()
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		self.cancel();
	}
}

impl std::fmt::Debug for Debouncer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Debouncer")
			.field("pending", &self.is_pending())
			.finish()
	}
}

/* src/bus/mod.rs */

//!
//! Multicast event bus without replay.
//!
//! Every [`Bus::subscribe`] call creates a dedicated unbounded queue, so a
//! subscriber only sees events sent after it subscribed and a slow (or
//! absent) subscriber never blocks [`Bus::send`].
//!
//! ```text
//! send(e) ──► Bus ──┬──► [queue] ──► Subscription 1
//!                   ├──► [queue] ──► Subscription 2
//!                   └──► [queue] ──► Subscription N
//! ```
//!
//! Abandoned subscriptions are released when they are dropped, and any queue
//! whose receiver is gone is pruned on the next `send` or count.

mod subscription;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::sync::lock;

pub use subscription::Subscription;

pub(crate) struct Subscribers<E> {
	senders: HashMap<u64, mpsc::UnboundedSender<E>>,
	finished: bool,
}

/// Broadcasts events to any number of independently-lived subscriptions.
pub struct Bus<E> {
	inner: Arc<Mutex<Subscribers<E>>>,
	next_id: AtomicU64,
}

impl<E> Bus<E> {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(Mutex::new(Subscribers {
				senders: HashMap::new(),
				finished: false,
			})),
			next_id: AtomicU64::new(0),
		}
	}

	/// Opens a new subscription that observes events sent from now on.
	///
	/// After [`finish`](Bus::finish) the returned subscription is already
	/// terminated.
	pub fn subscribe(&self) -> Subscription<E> {
		let (tx, rx) = mpsc::unbounded_channel();
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);

		let mut inner = lock(&self.inner);
		if !inner.finished {
			inner.senders.insert(id, tx);
		}
		drop(inner);

		Subscription::new(id, rx, Arc::downgrade(&self.inner))
	}

	/// Terminates every subscription and releases all subscriber state.
	///
	/// Later subscriptions end immediately and later sends are dropped.
	pub fn finish(&self) {
		let mut inner = lock(&self.inner);
		inner.finished = true;
		inner.senders.clear();
	}

	pub fn is_finished(&self) -> bool {
		lock(&self.inner).finished
	}

	/// Number of subscriptions that are still being consumed.
	pub fn subscriber_count(&self) -> usize {
		let mut inner = lock(&self.inner);
		inner.senders.retain(|_, sender| !sender.is_closed());
		inner.senders.len()
	}
}

impl<E: Clone> Bus<E> {
	/// Delivers `event` to every active subscription without waiting on any
	/// of them. Returns how many received it.
	pub fn send(&self, event: E) -> usize {
		let mut inner = lock(&self.inner);
		inner
			.senders
			.retain(|_, sender| sender.send(event.clone()).is_ok());
		inner.senders.len()
	}
}

impl<E> Default for Bus<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> std::fmt::Debug for Bus<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = lock(&self.inner);
		f.debug_struct("Bus")
			.field("subscribers", &inner.senders.len())
			.field("finished", &inner.finished)
			.finish()
	}
}

/* src/bus/subscription.rs */

use std::pin::Pin;
use std::sync::{Mutex, Weak};
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::Subscribers;
use crate::sync::lock;

/// One subscriber's view of a [`Bus`](super::Bus).
///
/// Implements [`futures_util::Stream`]; the stream ends when the bus is
/// finished or dropped. Dropping the subscription unregisters it.
pub struct Subscription<E> {
	id: u64,
	inner: UnboundedReceiverStream<E>,
	bus: Weak<Mutex<Subscribers<E>>>,
}

impl<E> Subscription<E> {
	pub(crate) fn new(
		id: u64,
		rx: mpsc::UnboundedReceiver<E>,
		bus: Weak<Mutex<Subscribers<E>>>,
	) -> Self {
		Self {
			id,
			inner: UnboundedReceiverStream::new(rx),
			bus,
		}
	}

	/// Waits for the next event. Returns `None` once the bus has finished.
	pub async fn recv(&mut self) -> Option<E> {
		self.inner.as_mut().recv().await
	}

	/// Returns an already-queued event without waiting.
	pub fn try_recv(&mut self) -> Option<E> {
		self.inner.as_mut().try_recv().ok()
	}
}

impl<E> Stream for Subscription<E> {
	type Item = E;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.inner).poll_next(cx)
	}
}

impl<E> Drop for Subscription<E> {
	fn drop(&mut self) {
		if let Some(bus) = self.bus.upgrade() {
			lock(&bus).senders.remove(&self.id);
		}
	}
}

impl<E> std::fmt::Debug for Subscription<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}

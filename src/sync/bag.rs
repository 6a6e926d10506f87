/* src/sync/bag.rs */

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use super::lock;

/// Anything that can be told to stop.
pub trait Cancellable: Send + Sync {
	fn cancel(&self);
}

impl Cancellable for CancellationToken {
	fn cancel(&self) {
		CancellationToken::cancel(self);
	}
}

impl Cancellable for AbortHandle {
	fn cancel(&self) {
		self.abort();
	}
}

/// Identifier returned by [`CancelBag::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

struct Entry {
	tag: Option<Cow<'static, str>>,
	handle: Box<dyn Cancellable>,
}

/// Collection of live cancellable handles.
///
/// Cancelling a handle removes it from the bag, so no handle is ever
/// cancelled twice. All operations are safe to call concurrently; handles
/// are cancelled after the internal lock is released.
#[derive(Default)]
pub struct CancelBag {
	entries: Mutex<HashMap<HandleId, Entry>>,
	next_id: AtomicU64,
}

impl CancelBag {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a handle and returns its id.
	pub fn insert(&self, handle: impl Cancellable + 'static) -> HandleId {
		self.insert_entry(None, Box::new(handle))
	}

	/// Stores a handle under a tag so it can be cancelled as part of a group.
	pub fn insert_tagged(
		&self,
		tag: impl Into<Cow<'static, str>>,
		handle: impl Cancellable + 'static,
	) -> HandleId {
		self.insert_entry(Some(tag.into()), Box::new(handle))
	}

	fn insert_entry(&self, tag: Option<Cow<'static, str>>, handle: Box<dyn Cancellable>) -> HandleId {
		let id = HandleId(self.next_id.fetch_add(1, Ordering::Relaxed));
		lock(&self.entries).insert(id, Entry { tag, handle });
		id
	}

	/// Removes a handle without cancelling it.
	///
	/// Returns false if the handle was already cancelled or removed.
	pub fn remove(&self, id: HandleId) -> bool {
		lock(&self.entries).remove(&id).is_some()
	}

	/// Cancels and removes a single handle.
	pub fn cancel(&self, id: HandleId) -> bool {
		let entry = lock(&self.entries).remove(&id);
		match entry {
			Some(entry) => {
				entry.handle.cancel();
				true
			}
			None => false,
		}
	}

	/// Cancels and removes every handle carrying `tag`. Returns how many were cancelled.
	pub fn cancel_tag(&self, tag: &str) -> usize {
		let cancelled: Vec<Entry> = {
			let mut entries = lock(&self.entries);
			let ids: Vec<HandleId> = entries
				.iter()
				.filter(|(_, entry)| entry.tag.as_deref() == Some(tag))
				.map(|(id, _)| *id)
				.collect();
			ids.iter().filter_map(|id| entries.remove(id)).collect()
		};

		for entry in &cancelled {
			entry.handle.cancel();
		}
		cancelled.len()
	}

	/// Cancels and removes every handle. Safe to call on an empty bag.
	pub fn cancel_all(&self) -> usize {
		let drained: Vec<Entry> = lock(&self.entries).drain().map(|(_, entry)| entry).collect();
		for entry in &drained {
			entry.handle.cancel();
		}
		drained.len()
	}

	pub fn contains(&self, id: HandleId) -> bool {
		lock(&self.entries).contains_key(&id)
	}

	pub fn len(&self) -> usize {
		lock(&self.entries).len()
	}

	pub fn is_empty(&self) -> bool {
		lock(&self.entries).is_empty()
	}
}

impl std::fmt::Debug for CancelBag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CancelBag").field("len", &self.len()).finish()
	}
}

/* src/sync/mod.rs */

//!
//! Coordination primitives used by the engine and available on their own.
//!
//! - [`CancelBag`] - collection of live cancellable handles
//! - [`Debouncer`] - single-slot delayed operation
//! - [`Gate`] - dedupes overlapping executions of one operation
//! - [`Throttler`] - per-key window merging calls into one execution

mod bag;
mod debounce;
mod gate;
mod throttle;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use bag::{CancelBag, Cancellable, HandleId};
pub use debounce::Debouncer;
pub use gate::Gate;
pub use throttle::Throttler;

/// Locks a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

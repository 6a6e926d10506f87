/* src/lib.rs */

//!
//! An async load-state engine.
//!
//! An [`Engine`] wraps one asynchronous fetch, exposes its progress as an
//! observable [`Status`], and keeps behavior well defined when manual
//! refreshes, timers, connectivity changes, lifecycle events and source swaps
//! race to reload the same data.
//!
//! This crate integrates these components:
//!
//! - **state**: `Status`, `Event`, `RefreshRequest`, `Disposition` and `LoadError`.
//! - **sync**: coordination primitives (`CancelBag`, `Debouncer`, `Gate`, `Throttler`).
//! - **bus**: non-replaying multicast of engine events.
//! - **provider**: the fetch capability and stock providers.
//! - **store**: persistence boundary used by `Persisted` providers.
//! - **signal**: connectivity and lifecycle source contracts.
//! - **engine**: the orchestrator tying the above together (`Engine`).
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `serde`: `Serialize`/`Deserialize` for `Config` and signal types.
//! - `toml`: `Config::from_toml_str`.
//!
//! ## Basic Usage
//!
//! See `demos/basic.rs` for a complete example.

pub mod bus;
pub mod engine;
pub mod provider;
pub mod signal;
pub mod state;
pub mod store;
pub mod sync;

pub use engine::{Config, Engine, EngineBuilder};
pub use state::{Disposition, Event, LoadError, RefreshRequest, Status};

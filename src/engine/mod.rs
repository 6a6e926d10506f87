/* src/engine/mod.rs */

//!
//! The load engine: owns a [`Status`](crate::state::Status), runs the
//! single-flight fetch, debounces bursts of refreshes and broadcasts every
//! transition.
//!
//! - [`Engine`] - cloneable handle to one engine instance
//! - [`EngineBuilder`] - wires a provider, configuration and signal sources
//! - [`Config`] - immutable engine settings

/// Logs an engine lifecycle record at `debug` when the engine runs in debug
/// mode and at `trace` otherwise.
macro_rules! engine_log {
	($config:expr, $($arg:tt)+) => {{
		let config: &$crate::engine::Config = &$config;
		if config.debug {
			tracing::debug!(label = %config.label, $($arg)+)
		} else {
			tracing::trace!(label = %config.label, $($arg)+)
		}
	}};
}

mod builder;
mod config;
mod error;
mod handle;
mod refresh;
mod watch;

pub use builder::EngineBuilder;
pub use config::{Config, DEFAULT_DEBOUNCE_INTERVAL};
pub use handle::Engine;
pub use error::EngineError;

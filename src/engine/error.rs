/* src/engine/error.rs */

use thiserror::Error;

/// Errors raised while assembling an engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("a provider is required")]
	MissingProvider,

	#[cfg(feature = "toml")]
	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),
}

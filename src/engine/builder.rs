/* src/engine/builder.rs */

use super::handle::ProviderRef;
use super::{Config, Engine, EngineError};
use crate::provider::{Fixed, Provider};
use crate::signal::{Connectivity, Lifecycle};
use crate::state::LoadError;

/// Builder for [`Engine`].
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), loadstate::engine::EngineError> {
/// use std::time::Duration;
/// use loadstate::engine::{Config, Engine};
/// use loadstate::provider::FnProvider;
///
/// let engine = Engine::builder()
/// 	.provider(FnProvider::new(|| async { Ok::<_, loadstate::LoadError>(42) }))
/// 	.config(Config::new().refresh_interval(Duration::from_secs(60)))
/// 	.build()?;
/// engine.on_task().await;
/// # Ok(())
/// # }
/// ```
pub struct EngineBuilder<T> {
	provider: Option<ProviderRef<T>>,
	config: Config,
	connectivity: Vec<Box<dyn Connectivity>>,
	lifecycle: Vec<Box<dyn Lifecycle>>,
}

impl<T> EngineBuilder<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self {
			provider: None,
			config: Config::default(),
			connectivity: Vec::new(),
			lifecycle: Vec::new(),
		}
	}

	pub fn provider(mut self, provider: impl Provider<T> + 'static) -> Self {
		self.provider = Some(Box::new(provider));
		self
	}

	/// Uses a constant value as the source.
	pub fn value(self, value: T) -> Self {
		self.provider(Fixed::Value(value))
	}

	/// Uses a constant error as the source.
	pub fn error(self, error: LoadError) -> Self {
		self.provider(Fixed::<T>::Error(error))
	}

	pub fn config(mut self, config: Config) -> Self {
		self.config = config;
		self
	}

	/// Attaches a connectivity source when the engine is built.
	pub fn connectivity(mut self, source: impl Connectivity + 'static) -> Self {
		self.connectivity.push(Box::new(source));
		self
	}

	/// Attaches a lifecycle source when the engine is built.
	pub fn lifecycle(mut self, source: impl Lifecycle + 'static) -> Self {
		self.lifecycle.push(Box::new(source));
		self
	}

	/// Builds the engine, starting its timer and signal adapters.
	///
	/// Must be called from within a tokio runtime when a timer or a signal
	/// source is configured.
	pub fn build(self) -> Result<Engine<T>, EngineError> {
		let provider = self.provider.ok_or(EngineError::MissingProvider)?;
		let engine = Engine::from_parts(provider, self.config);

		engine.start_timer();
		for source in self.connectivity {
			engine.watch_connectivity(source);
		}
		for source in self.lifecycle {
			engine.watch_lifecycle(source);
		}

		Ok(engine)
	}
}

impl<T> Default for EngineBuilder<T>
where
	T: Clone + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

/* src/provider/func.rs */

use std::future::Future;

use async_trait::async_trait;

use super::Provider;
use crate::state::LoadError;

/// Closure-backed provider.
///
/// Wraps `F: Fn() -> Fut`, producing a fresh fetch future per load.
///
/// ```rust
/// use loadstate::provider::FnProvider;
///
/// let provider = FnProvider::new(|| async { Ok::<_, loadstate::LoadError>(42) });
/// # let _ = provider;
/// ```
pub struct FnProvider<F> {
	f: F,
}

impl<F> FnProvider<F> {
	pub fn new(f: F) -> Self {
		Self { f }
	}
}

#[async_trait]
impl<T, F, Fut> Provider<T> for FnProvider<F>
where
	T: Send + Sync + 'static,
	F: Fn() -> Fut + Send + Sync,
	Fut: Future<Output = Result<T, LoadError>> + Send,
{
	async fn load(&self) -> Result<T, LoadError> {
		(self.f)().await
	}
}

impl<F> std::fmt::Debug for FnProvider<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FnProvider").finish_non_exhaustive()
	}
}

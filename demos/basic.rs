/* demos/basic.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use loadstate::engine::{Config, Engine};
use loadstate::provider::FnProvider;
use loadstate::signal::{LifecycleEvent, ManualConnectivity, ManualLifecycle, NetworkState};
use loadstate::{Event, LoadError, RefreshRequest};

#[derive(Debug, Clone)]
struct Profile {
	name: String,
	revision: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// 0. A fetch that is offline on its first attempt
	let attempts = Arc::new(AtomicU32::new(0));
	let counter = Arc::clone(&attempts);
	let provider = FnProvider::new(move || {
		let revision = counter.fetch_add(1, Ordering::SeqCst);
		async move {
			tokio::time::sleep(Duration::from_millis(100)).await;
			if revision == 0 {
				return Err(LoadError::provider("network unreachable"));
			}
			Ok(Profile {
				name: "demo".to_string(),
				revision,
			})
		}
	});

	// 1. Signal sources the host pushes into
	let connectivity = Arc::new(ManualConnectivity::new());
	let lifecycle = Arc::new(ManualLifecycle::new());

	// 2. Build the engine
	let engine = Engine::builder()
		.provider(provider)
		.config(
			Config::new()
				.label("profile")
				.debounce_interval(Duration::from_millis(200))
				.refresh_interval(Duration::from_secs(5)),
		)
		.connectivity(Arc::clone(&connectivity))
		.lifecycle(Arc::clone(&lifecycle))
		.build()?;

	// 3. Print every status change
	let mut events = engine.subscribe();
	tokio::spawn(async move {
		while let Some(event) = events.recv().await {
			match event {
				Event::Fetched(profile) => println!("fetched: {profile:?}"),
				Event::StatusUpdated(status) => println!("status: {}", status.name()),
			}
		}
		println!("event stream finished");
	});

	// 4. First observation; the fetch fails
	engine.on_task().await;
	println!("after first load: error = {:?}", engine.error());

	// 5. Network comes back; the engine recovers on its own
	connectivity.set(NetworkState::Wifi);
	tokio::time::sleep(Duration::from_millis(500)).await;
	println!("after reconnect: value = {:?}", engine.value());

	// 6. Foreground notifications are debounced into one fetch
	lifecycle.notify(LifecycleEvent::EnteredForeground);
	lifecycle.notify(LifecycleEvent::SignificantTimeChange);
	tokio::time::sleep(Duration::from_millis(500)).await;

	// 7. A manual refresh cancelled mid-flight rolls back
	engine.refresh(RefreshRequest::new("manual")).await?;
	tokio::time::sleep(Duration::from_millis(20)).await;
	engine.cancel();
	println!("after cancel: value = {:?}", engine.value());

	engine.shutdown();
	tokio::time::sleep(Duration::from_millis(50)).await;
	Ok(())
}

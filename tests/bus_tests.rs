/* tests/bus_tests.rs */

use futures_util::StreamExt;
use loadstate::bus::Bus;

#[tokio::test]
async fn test_fan_out_to_every_subscriber() {
	let bus = Bus::new();
	let mut subscribers: Vec<_> = (0..4).map(|_| bus.subscribe()).collect();

	assert_eq!(bus.send(7), 4);

	for sub in subscribers.iter_mut() {
		assert_eq!(sub.recv().await, Some(7));
	}
}

#[tokio::test]
async fn test_no_replay_for_late_subscriber() {
	let bus = Bus::new();
	let mut early = bus.subscribe();
	bus.send(1);

	let mut late = bus.subscribe();
	bus.send(2);

	assert_eq!(early.recv().await, Some(1));
	assert_eq!(early.recv().await, Some(2));
	assert_eq!(late.recv().await, Some(2));
	assert_eq!(late.try_recv(), None);
}

#[tokio::test]
async fn test_finish_terminates_subscribers() {
	let bus = Bus::new();
	let mut first = bus.subscribe();
	let second = bus.subscribe();
	bus.send("queued");

	bus.finish();

	assert_eq!(bus.subscriber_count(), 0);
	assert!(bus.is_finished());
	// Events queued before finish are still delivered, then the stream ends.
	assert_eq!(first.recv().await, Some("queued"));
	assert_eq!(first.recv().await, None);

	let collected: Vec<_> = second.collect().await;
	assert_eq!(collected, vec!["queued"]);

	let mut after = bus.subscribe();
	assert_eq!(after.recv().await, None);
	assert_eq!(bus.send("dropped"), 0);
}

#[tokio::test]
async fn test_dropped_subscriber_is_released() {
	let bus = Bus::new();
	let keep = bus.subscribe();
	let gone = bus.subscribe();
	assert_eq!(bus.subscriber_count(), 2);

	drop(gone);
	assert_eq!(bus.subscriber_count(), 1);
	assert_eq!(bus.send(1), 1);
	drop(keep);
	assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn test_abandoned_stream_is_released() {
	let bus: Bus<i32> = Bus::new();
	let sub = bus.subscribe();

	let handle = tokio::spawn(async move {
		let mut sub = sub;
		let _ = sub.next().await;
	});
	tokio::task::yield_now().await;
	handle.abort();
	let _ = handle.await;

	assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn test_send_never_waits_on_idle_subscriber() {
	let bus = Bus::new();
	let mut idle = bus.subscribe();

	for i in 0..10_000 {
		bus.send(i);
	}

	assert_eq!(idle.recv().await, Some(0));
	assert_eq!(bus.subscriber_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subscribers_consume_independently() {
	let bus = std::sync::Arc::new(Bus::new());
	let mut readers = Vec::new();
	for _ in 0..3 {
		let sub = bus.subscribe();
		readers.push(tokio::spawn(async move { sub.take(100).collect::<Vec<u32>>().await }));
	}

	for i in 0..100 {
		bus.send(i);
	}

	for reader in readers {
		let events = reader.await.unwrap();
		assert_eq!(events, (0..100).collect::<Vec<_>>());
	}
}

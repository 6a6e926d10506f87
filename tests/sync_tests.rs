/* tests/sync_tests.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use loadstate::LoadError;
use loadstate::sync::{CancelBag, Debouncer, Gate, Throttler};
use tokio_util::sync::CancellationToken;

fn exploding() -> Result<u32, LoadError> {
	panic!("exploding op")
}

#[test]
fn test_bag_cancel_by_id() {
	let bag = CancelBag::new();
	let a = CancellationToken::new();
	let b = CancellationToken::new();
	let id_a = bag.insert(a.clone());
	let id_b = bag.insert(b.clone());

	assert!(bag.cancel(id_a));
	assert!(a.is_cancelled());
	assert!(!b.is_cancelled());
	assert!(!bag.contains(id_a));
	assert!(bag.contains(id_b));

	// Already removed; not cancelled again.
	assert!(!bag.cancel(id_a));
	assert_eq!(bag.len(), 1);
}

#[test]
fn test_bag_cancel_by_tag() {
	let bag = CancelBag::new();
	let timers: Vec<_> = (0..3).map(|_| CancellationToken::new()).collect();
	for token in &timers {
		bag.insert_tagged("timer", token.clone());
	}
	let fetch = CancellationToken::new();
	bag.insert_tagged("fetch", fetch.clone());

	assert_eq!(bag.cancel_tag("timer"), 3);
	assert!(timers.iter().all(CancellationToken::is_cancelled));
	assert!(!fetch.is_cancelled());
	assert_eq!(bag.cancel_tag("timer"), 0);
	assert_eq!(bag.len(), 1);
}

#[test]
fn test_bag_cancel_all_is_idempotent() {
	let bag = CancelBag::new();
	assert_eq!(bag.cancel_all(), 0);

	let token = CancellationToken::new();
	bag.insert(token.clone());
	assert_eq!(bag.cancel_all(), 1);
	assert!(token.is_cancelled());
	assert_eq!(bag.cancel_all(), 0);
	assert!(bag.is_empty());
}

#[test]
fn test_bag_remove_does_not_cancel() {
	let bag = CancelBag::new();
	let token = CancellationToken::new();
	let id = bag.insert(token.clone());

	assert!(bag.remove(id));
	assert!(!token.is_cancelled());
	assert_eq!(bag.cancel_all(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bag_concurrent_access() {
	let bag = Arc::new(CancelBag::new());
	let mut tasks = Vec::new();
	for _ in 0..8 {
		let bag = Arc::clone(&bag);
		tasks.push(tokio::spawn(async move {
			let mut tokens = Vec::new();
			for _ in 0..100 {
				let token = CancellationToken::new();
				bag.insert(token.clone());
				tokens.push(token);
			}
			bag.cancel_all();
			tokens
		}));
	}

	let mut all = Vec::new();
	for task in tasks {
		all.extend(task.await.unwrap());
	}
	bag.cancel_all();

	assert!(bag.is_empty());
	assert!(all.iter().all(CancellationToken::is_cancelled));
}

#[tokio::test]
async fn test_debounce_runs_only_latest() {
	let debouncer = Debouncer::new();
	let fired = Arc::new(AtomicUsize::new(0));

	for i in 1..=3 {
		let fired = Arc::clone(&fired);
		debouncer.schedule(Duration::from_millis(50), async move {
			fired.store(i, Ordering::SeqCst);
		});
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	assert!(debouncer.is_pending());

	tokio::time::sleep(Duration::from_millis(150)).await;
	assert_eq!(fired.load(Ordering::SeqCst), 3);
	assert!(!debouncer.is_pending());
}

#[tokio::test]
async fn test_debounce_cancel() {
	let debouncer = Debouncer::new();
	let fired = Arc::new(AtomicUsize::new(0));

	let counter = Arc::clone(&fired);
	debouncer.schedule(Duration::from_millis(30), async move {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	assert!(debouncer.cancel());
	assert!(!debouncer.cancel());

	tokio::time::sleep(Duration::from_millis(100)).await;
	assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_debounce_concurrent_schedule_leaves_one() {
	let debouncer = Arc::new(Debouncer::new());
	let fired = Arc::new(AtomicUsize::new(0));

	let tasks: Vec<_> = (0..16)
		.map(|_| {
			let debouncer = Arc::clone(&debouncer);
			let fired = Arc::clone(&fired);
			tokio::spawn(async move {
				debouncer.schedule(Duration::from_millis(50), async move {
					fired.fetch_add(1, Ordering::SeqCst);
				});
			})
		})
		.collect();
	for task in tasks {
		task.await.unwrap();
	}

	tokio::time::sleep(Duration::from_millis(200)).await;
	assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_gate_dedupes_overlapping_calls() {
	let gate = Gate::new();
	let runs = Arc::new(AtomicUsize::new(0));

	let calls = (0..5).map(|_| {
		let runs = Arc::clone(&runs);
		gate.perform(move || async move {
			let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
			tokio::time::sleep(Duration::from_millis(50)).await;
			Ok::<_, LoadError>(n)
		})
	});
	let results = join_all(calls).await;

	assert_eq!(runs.load(Ordering::SeqCst), 1);
	assert!(results.iter().all(|r| r == &Ok(1)));
	assert!(!gate.is_active());

	// No merge window once the execution finished.
	let runs_again = Arc::clone(&runs);
	let next = gate
		.perform(move || async move { Ok(runs_again.fetch_add(1, Ordering::SeqCst) + 1) })
		.await;
	assert_eq!(next, Ok(2));
}

#[tokio::test]
async fn test_gate_shares_errors() {
	let gate: Gate<u32> = Gate::new();
	let calls = (0..3).map(|_| {
		gate.perform(|| async {
			tokio::time::sleep(Duration::from_millis(20)).await;
			Err(LoadError::provider("boom"))
		})
	});

	for result in join_all(calls).await {
		assert_eq!(result, Err(LoadError::provider("boom")));
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gate_cancel() {
	let gate: Arc<Gate<u32>> = Arc::new(Gate::new());

	let waiters: Vec<_> = (0..3)
		.map(|_| {
			let gate = Arc::clone(&gate);
			tokio::spawn(async move {
				gate.perform(|| async {
					tokio::time::sleep(Duration::from_secs(10)).await;
					Ok(1)
				})
				.await
			})
		})
		.collect();

	tokio::time::sleep(Duration::from_millis(50)).await;
	assert!(gate.is_active());
	assert!(gate.cancel());
	assert!(!gate.is_active());

	for waiter in waiters {
		assert_eq!(waiter.await.unwrap(), Err(LoadError::Cancelled));
	}
}

#[tokio::test]
async fn test_throttle_merges_calls_within_window() {
	let throttler: Throttler<&str, usize> = Throttler::new();
	let runs = Arc::new(AtomicUsize::new(0));

	let calls = (0..5).map(|i| {
		let runs = Arc::clone(&runs);
		throttler.schedule("profile", Duration::from_millis(50), move || async move {
			runs.fetch_add(1, Ordering::SeqCst);
			Ok(i)
		})
	});
	let results = join_all(calls).await;

	assert_eq!(runs.load(Ordering::SeqCst), 1);
	// The most recently supplied op wins and every caller gets its result.
	assert!(results.iter().all(|r| r == &Ok(4)));
	assert!(!throttler.is_active(&"profile"));
}

#[tokio::test]
async fn test_throttle_fans_out_errors() {
	let throttler: Throttler<u8, u32> = Throttler::new();

	let calls = (0..3).map(|_| {
		throttler.schedule(1, Duration::from_millis(20), || async {
			Err(LoadError::provider("offline"))
		})
	});

	for result in join_all(calls).await {
		assert_eq!(result, Err(LoadError::provider("offline")));
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_throttle_keys_are_independent() {
	let throttler: Arc<Throttler<String, String>> = Arc::new(Throttler::new());

	let slow = {
		let throttler = Arc::clone(&throttler);
		tokio::spawn(async move {
			throttler
				.schedule("slow".to_string(), Duration::from_millis(300), || async {
					Ok("slow".to_string())
				})
				.await
		})
	};

	let started = tokio::time::Instant::now();
	let fast = throttler
		.schedule("fast".to_string(), Duration::from_millis(20), || async {
			Ok("fast".to_string())
		})
		.await;

	assert_eq!(fast, Ok("fast".to_string()));
	assert!(started.elapsed() < Duration::from_millis(250));
	assert_eq!(throttler.active_keys(), 1);
	assert_eq!(slow.await.unwrap(), Ok("slow".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_throttle_cancel_resolves_waiters() {
	let throttler: Arc<Throttler<&'static str, u32>> = Arc::new(Throttler::new());
	let runs = Arc::new(AtomicUsize::new(0));

	let waiters: Vec<_> = (0..3)
		.map(|_| {
			let throttler = Arc::clone(&throttler);
			let runs = Arc::clone(&runs);
			tokio::spawn(async move {
				throttler
					.schedule("feed", Duration::from_millis(100), move || async move {
						runs.fetch_add(1, Ordering::SeqCst);
						Ok(1)
					})
					.await
			})
		})
		.collect();

	tokio::time::sleep(Duration::from_millis(30)).await;
	assert!(throttler.cancel(&"feed"));
	assert!(!throttler.is_active(&"feed"));

	for waiter in waiters {
		assert_eq!(waiter.await.unwrap(), Err(LoadError::Cancelled));
	}
	tokio::time::sleep(Duration::from_millis(150)).await;
	assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_throttle_cancel_aborts_running_execution() {
	let throttler: Arc<Throttler<u8, u32>> = Arc::new(Throttler::new());

	let waiter = {
		let throttler = Arc::clone(&throttler);
		tokio::spawn(async move {
			throttler
				.schedule(7, Duration::from_millis(10), || async {
					tokio::time::sleep(Duration::from_secs(10)).await;
					Ok(1)
				})
				.await
		})
	};

	tokio::time::sleep(Duration::from_millis(50)).await;
	throttler.cancel_all();

	assert_eq!(waiter.await.unwrap(), Err(LoadError::Cancelled));
	assert_eq!(throttler.active_keys(), 0);
}

#[tokio::test]
async fn test_gate_recovers_after_panicking_op() {
	let gate: Gate<u32> = Gate::new();

	let first = gate.perform(|| async { exploding() }).await;
	assert!(matches!(first, Err(ref e) if !e.is_cancelled()));
	assert!(!gate.is_active());

	let runs = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&runs);
	let second = gate
		.perform(move || async move {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(5)
		})
		.await;

	assert_eq!(second, Ok(5));
	assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_throttle_resolves_waiters_when_op_panics() {
	let throttler: Throttler<&str, u32> = Throttler::new();

	let calls = (0..3).map(|_| {
		throttler.schedule("k", Duration::from_millis(10), || async { exploding() })
	});
	let results = tokio::time::timeout(Duration::from_millis(500), join_all(calls))
		.await
		.expect("merged callers must not hang");

	for result in results {
		assert!(matches!(result, Err(ref e) if !e.is_cancelled()));
	}
	assert!(!throttler.is_active(&"k"));

	let next = throttler
		.schedule("k", Duration::from_millis(10), || async { Ok(1) })
		.await;
	assert_eq!(next, Ok(1));
}

/* tests/status_tests.rs */

use loadstate::{Disposition, Event, LoadError, RefreshRequest, Status};

#[test]
fn test_value_accessor() {
	assert_eq!(Status::<i32>::NotRequested.value(), None);
	assert_eq!(Status::Loading { last: Some(1) }.value(), Some(&1));
	assert_eq!(Status::<i32>::Loading { last: None }.value(), None);
	assert_eq!(Status::Loaded(2).value(), Some(&2));
	assert_eq!(Status::<i32>::Failed(LoadError::Cancelled).value(), None);
}

#[test]
fn test_error_accessor() {
	assert!(Status::<i32>::NotRequested.error().is_none());
	assert!(Status::Loaded(1).error().is_none());
	assert!(Status::Loading { last: Some(1) }.error().is_none());
	assert_eq!(
		Status::<i32>::Failed(LoadError::Cancelled).error(),
		Some(&LoadError::Cancelled)
	);
}

#[test]
fn test_to_loading() {
	let loaded = Status::Loaded(5);
	assert_eq!(loaded.to_loading(false), Status::Loading { last: Some(5) });
	assert_eq!(loaded.to_loading(true), Status::Loading { last: None });

	let failed = Status::<i32>::Failed(LoadError::provider("boom"));
	assert_eq!(failed.to_loading(false), Status::Loading { last: None });

	let reloading = Status::Loading { last: Some(3) };
	assert_eq!(reloading.to_loading(false), Status::Loading { last: Some(3) });
}

#[test]
fn test_from_result() {
	assert_eq!(Status::from_result(Ok::<_, LoadError>(1)), Status::Loaded(1));
	assert!(Status::<i32>::from_result(Err(LoadError::Cancelled)).is_failed());
}

#[test]
fn test_default_is_not_requested() {
	let status: Status<String> = Status::default();
	assert!(status.is_not_requested());
	assert_eq!(status.name(), "not_requested");
	assert_eq!(Status::Loading { last: Some(1) }.name(), "reloading");
}

#[test]
fn test_load_error_equality() {
	assert_eq!(LoadError::provider("boom"), LoadError::provider("boom"));
	assert_ne!(LoadError::provider("boom"), LoadError::provider("bang"));
	assert_ne!(LoadError::provider("cancelled"), LoadError::Cancelled);
	assert_eq!(
		LoadError::OperationNotSupported("write"),
		LoadError::OperationNotSupported("write")
	);
	assert!(LoadError::Cancelled.is_cancelled());
	assert_eq!(LoadError::provider("boom").to_string(), "provider failure: boom");
}

#[test]
fn test_refresh_request_builders() {
	let request = RefreshRequest::debounced("timer").with_reset_last(true);
	assert_eq!(request.reason, "timer");
	assert!(request.debounce);
	assert!(request.reset_last);

	let request = RefreshRequest::default();
	assert!(!request.debounce);
	assert!(!request.reset_last);
}

#[test]
fn test_event_status() {
	let event = Event::StatusUpdated(Status::Loaded(1));
	assert_eq!(event.status(), Some(&Status::Loaded(1)));
	assert!(Event::Fetched(1).status().is_none());
	assert_eq!(Disposition::provide_value(1), Disposition::Provide(Ok(1)));
}

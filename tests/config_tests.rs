/* tests/config_tests.rs */

#![cfg(feature = "toml")]

use std::time::Duration;

use loadstate::engine::{Config, DEFAULT_DEBOUNCE_INTERVAL, EngineError};

#[test]
fn test_defaults() {
	let config = Config::default();
	assert_eq!(config.label, "engine");
	assert_eq!(config.refresh_interval, None);
	assert_eq!(config.debounce_interval, DEFAULT_DEBOUNCE_INTERVAL);
	assert_eq!(config.debounce_interval, Duration::from_millis(500));
	assert!(!config.debug);
}

#[test]
fn test_from_toml_str() {
	let config = Config::from_toml_str(
		r#"
		label = "profile"
		refresh_interval_ms = 60000
		debounce_interval_ms = 250
		debug = true
		"#,
	)
	.unwrap();

	assert_eq!(
		config,
		Config::new()
			.label("profile")
			.refresh_interval(Duration::from_secs(60))
			.debounce_interval(Duration::from_millis(250))
			.debug(true)
	);
}

#[test]
fn test_missing_fields_keep_defaults() {
	let config = Config::from_toml_str("label = \"feed\"").unwrap();
	assert_eq!(config, Config::new().label("feed"));

	let empty = Config::from_toml_str("").unwrap();
	assert_eq!(empty, Config::default());
}

#[test]
fn test_invalid_toml_is_rejected() {
	let result = Config::from_toml_str("debounce_interval_ms = \"soon\"");
	assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_round_trip_through_toml() {
	let config = Config::new()
		.label("rt")
		.refresh_interval(Duration::from_millis(1500));
	let text = toml::to_string(&config).unwrap();

	assert!(text.contains("refresh_interval_ms = 1500"));
	assert_eq!(Config::from_toml_str(&text).unwrap(), config);
}

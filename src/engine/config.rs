/* src/engine/config.rs */

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Debounce window applied when none is configured.
pub const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(500);

/// Engine settings, fixed for the engine's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
	/// Name attached to every log record of the engine.
	pub label: String,

	/// Period of the automatic refresh timer. `None` disables the timer.
	#[cfg_attr(
		feature = "serde",
		serde(rename = "refresh_interval_ms", with = "millis_opt")
	)]
	pub refresh_interval: Option<Duration>,

	/// Quiet period a debounced refresh waits for before fetching.
	#[cfg_attr(
		feature = "serde",
		serde(rename = "debounce_interval_ms", with = "millis")
	)]
	pub debounce_interval: Duration,

	/// Raises lifecycle logs from `trace` to `debug`.
	pub debug: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			label: "engine".to_string(),
			refresh_interval: None,
			debounce_interval: DEFAULT_DEBOUNCE_INTERVAL,
			debug: false,
		}
	}
}

impl Config {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn refresh_interval(mut self, interval: Duration) -> Self {
		self.refresh_interval = Some(interval);
		self
	}

	pub fn debounce_interval(mut self, interval: Duration) -> Self {
		self.debounce_interval = interval;
		self
	}

	pub fn debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	/// Parses a configuration from TOML. Missing fields keep their defaults.
	///
	/// ```toml
	/// label = "profile"
	/// refresh_interval_ms = 60000
	/// debounce_interval_ms = 250
	/// debug = true
	/// ```
	#[cfg(feature = "toml")]
	pub fn from_toml_str(input: &str) -> Result<Self, super::EngineError> {
		Ok(toml::from_str(input)?)
	}
}

#[cfg(feature = "serde")]
mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}

#[cfg(feature = "serde")]
mod millis_opt {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(
		value: &Option<Duration>,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		match value {
			Some(value) => {
				serializer.serialize_some(&u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
			}
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<Duration>, D::Error> {
		Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
	}
}

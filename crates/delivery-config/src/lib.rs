//! Configuration module for the delivery fee service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! validates that fee bounds, distance bands, peak windows and the restaurant
//! catalog are consistent before any fee is computed.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["fees.toml", "catalog.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;
pub mod schedule;

#[cfg(feature = "testing")]
pub mod builders;

use delivery_types::Restaurant;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub use schedule::TimeWindow;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the delivery fee service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this service instance.
	pub service: ServiceConfig,
	/// Fee composition settings.
	#[serde(default)]
	pub fees: FeesConfig,
	/// Distance estimator selection and implementation settings.
	pub distance: DistanceConfig,
	/// Restaurant catalog served to the fee engine.
	#[serde(default)]
	pub catalog: CatalogConfig,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Fee composition settings.
///
/// Every field has a default, so the `[fees]` section may be omitted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeesConfig {
	/// Lowest total fee ever charged.
	#[serde(default = "default_min_fee")]
	pub min_fee: Decimal,
	/// Highest total fee ever charged.
	#[serde(default = "default_max_fee")]
	pub max_fee: Decimal,
	/// Deliveries beyond this distance are not served.
	#[serde(default = "default_max_radius_km")]
	pub max_radius_km: f64,
	/// Ordered distance bands; each applies up to and including `up_to_km`.
	#[serde(default = "default_distance_bands")]
	pub distance_bands: Vec<DistanceBand>,
	/// Fee for distances past the last band.
	#[serde(default = "default_beyond_fee")]
	pub beyond_fee: Decimal,
	/// Peak-hour surcharge settings.
	#[serde(default)]
	pub peak_hour: PeakHourConfig,
	/// Weather surcharge settings.
	#[serde(default)]
	pub weather: WeatherConfig,
	/// Delivery time estimation settings.
	#[serde(default)]
	pub delivery_time: DeliveryTimeConfig,
	/// Deliveries whose earliest arrival is below this count as fast.
	#[serde(default = "default_fast_delivery_minutes")]
	pub fast_delivery_minutes: u32,
	/// Distance above which a long-distance note is attached.
	#[serde(default = "default_long_distance_notice_km")]
	pub long_distance_notice_km: f64,
	/// Maximum number of restaurants in one batch request.
	#[serde(default = "default_max_batch_size")]
	pub max_batch_size: usize,
}

/// One step of the distance fee function.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistanceBand {
	/// Upper bound of the band in kilometres, inclusive.
	pub up_to_km: f64,
	/// Fee charged inside the band.
	pub fee: Decimal,
}

/// Peak-hour surcharge settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeakHourConfig {
	#[serde(default = "default_peak_surcharge")]
	pub surcharge: Decimal,
	/// Windows applying Monday through Friday.
	#[serde(default = "default_weekday_windows")]
	pub weekday_windows: Vec<TimeWindow>,
	/// Windows applying on Saturday and Sunday.
	#[serde(default = "default_weekend_windows")]
	pub weekend_windows: Vec<TimeWindow>,
}

/// Weather surcharge settings.
///
/// The surcharge applies when the last digit of the destination code is in
/// `incidence_digits`; two digits out of ten model a 20% incidence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
	#[serde(default = "default_weather_surcharge")]
	pub surcharge: Decimal,
	#[serde(default = "default_incidence_digits")]
	pub incidence_digits: Vec<u8>,
}

/// Delivery time estimation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryTimeConfig {
	/// Average courier speed in urban traffic.
	#[serde(default = "default_average_speed_kmh")]
	pub average_speed_kmh: f64,
	/// Fixed preparation time.
	#[serde(default = "default_base_preparation_minutes")]
	pub base_preparation_minutes: u32,
	/// Extra preparation time per kilometre.
	#[serde(default = "default_preparation_minutes_per_km")]
	pub preparation_minutes_per_km: f64,
	/// Subtracted from the estimate to form the lower bound.
	#[serde(default = "default_lower_slack_minutes")]
	pub lower_slack_minutes: u32,
	/// Added to the estimate to form the upper bound.
	#[serde(default = "default_upper_slack_minutes")]
	pub upper_slack_minutes: u32,
	/// The lower bound never drops below this.
	#[serde(default = "default_minimum_lower_minutes")]
	pub minimum_lower_minutes: u32,
}

/// Distance estimator selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DistanceConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of estimator implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Restaurant catalog seeded at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
	#[serde(default)]
	pub restaurants: Vec<Restaurant>,
}

fn default_min_fee() -> Decimal {
	Decimal::new(200, 2)
}

fn default_max_fee() -> Decimal {
	Decimal::new(2500, 2)
}

fn default_max_radius_km() -> f64 {
	30.0
}

fn default_distance_bands() -> Vec<DistanceBand> {
	[(3.0, 0), (7.0, 150), (12.0, 300), (20.0, 500)]
		.into_iter()
		.map(|(up_to_km, cents)| DistanceBand {
			up_to_km,
			fee: Decimal::new(cents, 2),
		})
		.collect()
}

fn default_beyond_fee() -> Decimal {
	Decimal::new(800, 2)
}

fn default_peak_surcharge() -> Decimal {
	Decimal::new(200, 2)
}

fn default_weekday_windows() -> Vec<TimeWindow> {
	[((11, 30), (14, 0)), ((18, 0), (21, 0))]
		.into_iter()
		.filter_map(|(start, end)| TimeWindow::from_hm(start, end))
		.collect()
}

fn default_weekend_windows() -> Vec<TimeWindow> {
	[((12, 0), (15, 0)), ((19, 0), (22, 0))]
		.into_iter()
		.filter_map(|(start, end)| TimeWindow::from_hm(start, end))
		.collect()
}

fn default_weather_surcharge() -> Decimal {
	Decimal::new(150, 2)
}

fn default_incidence_digits() -> Vec<u8> {
	vec![0, 1]
}

fn default_average_speed_kmh() -> f64 {
	22.0
}

fn default_base_preparation_minutes() -> u32 {
	15
}

fn default_preparation_minutes_per_km() -> f64 {
	2.0
}

fn default_lower_slack_minutes() -> u32 {
	10
}

fn default_upper_slack_minutes() -> u32 {
	15
}

fn default_minimum_lower_minutes() -> u32 {
	15
}

fn default_fast_delivery_minutes() -> u32 {
	30
}

fn default_long_distance_notice_km() -> f64 {
	15.0
}

fn default_max_batch_size() -> usize {
	10
}

impl Default for FeesConfig {
	fn default() -> Self {
		Self {
			min_fee: default_min_fee(),
			max_fee: default_max_fee(),
			max_radius_km: default_max_radius_km(),
			distance_bands: default_distance_bands(),
			beyond_fee: default_beyond_fee(),
			peak_hour: PeakHourConfig::default(),
			weather: WeatherConfig::default(),
			delivery_time: DeliveryTimeConfig::default(),
			fast_delivery_minutes: default_fast_delivery_minutes(),
			long_distance_notice_km: default_long_distance_notice_km(),
			max_batch_size: default_max_batch_size(),
		}
	}
}

impl Default for PeakHourConfig {
	fn default() -> Self {
		Self {
			surcharge: default_peak_surcharge(),
			weekday_windows: default_weekday_windows(),
			weekend_windows: default_weekend_windows(),
		}
	}
}

impl Default for WeatherConfig {
	fn default() -> Self {
		Self {
			surcharge: default_weather_surcharge(),
			incidence_digits: default_incidence_digits(),
		}
	}
}

impl Default for DeliveryTimeConfig {
	fn default() -> Self {
		Self {
			average_speed_kmh: default_average_speed_kmh(),
			base_preparation_minutes: default_base_preparation_minutes(),
			preparation_minutes_per_km: default_preparation_minutes_per_km(),
			lower_slack_minutes: default_lower_slack_minutes(),
			upper_slack_minutes: default_upper_slack_minutes(),
			minimum_lower_minutes: default_minimum_lower_minutes(),
		}
	}
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with async environment variable resolution.
	///
	/// Files may pull in others with `include = ["fees.toml", "catalog.toml"]`.
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		loader::ConfigLoader::default().load(Path::new(path)).await
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - Ensures the service ID is not empty
	/// - Checks fee bounds, bands, surcharges and time estimation settings
	/// - Verifies the primary distance estimator is configured
	/// - Rejects duplicate restaurant ids and negative base fees
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		self.fees.validate()?;

		if self.distance.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Distance primary implementation cannot be empty".into(),
			));
		}
		if !self
			.distance
			.implementations
			.contains_key(&self.distance.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary distance estimator '{}' not found in implementations",
				self.distance.primary
			)));
		}

		let mut seen = HashSet::new();
		for restaurant in &self.catalog.restaurants {
			if !seen.insert(restaurant.id) {
				return Err(ConfigError::Validation(format!(
					"Duplicate restaurant id {} in catalog",
					restaurant.id
				)));
			}
			if restaurant.base_fee.is_sign_negative() {
				return Err(ConfigError::Validation(format!(
					"Restaurant {} has a negative base_fee",
					restaurant.id
				)));
			}
		}

		Ok(())
	}
}

impl FeesConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		if self.min_fee.is_sign_negative() {
			return Err(ConfigError::Validation("min_fee cannot be negative".into()));
		}
		if self.min_fee > self.max_fee {
			return Err(ConfigError::Validation(format!(
				"min_fee ({}) cannot exceed max_fee ({})",
				self.min_fee, self.max_fee
			)));
		}
		if !(self.max_radius_km > 0.0) {
			return Err(ConfigError::Validation(
				"max_radius_km must be greater than 0".into(),
			));
		}

		let mut previous: Option<&DistanceBand> = None;
		for band in &self.distance_bands {
			if !(band.up_to_km > 0.0) || band.fee.is_sign_negative() {
				return Err(ConfigError::Validation(format!(
					"Distance band up to {} km must have a positive bound and non-negative fee",
					band.up_to_km
				)));
			}
			if let Some(prev) = previous {
				if band.up_to_km <= prev.up_to_km {
					return Err(ConfigError::Validation(format!(
						"Distance bands must be strictly increasing: {} km follows {} km",
						band.up_to_km, prev.up_to_km
					)));
				}
				if band.fee < prev.fee {
					return Err(ConfigError::Validation(format!(
						"Distance band fees must not decrease: {} km costs less than {} km",
						band.up_to_km, prev.up_to_km
					)));
				}
			}
			previous = Some(band);
		}
		if let Some(last) = previous {
			if self.beyond_fee < last.fee {
				return Err(ConfigError::Validation(
					"beyond_fee cannot be lower than the last distance band fee".into(),
				));
			}
		}

		if self.peak_hour.surcharge.is_sign_negative()
			|| self.weather.surcharge.is_sign_negative()
		{
			return Err(ConfigError::Validation(
				"Surcharges cannot be negative".into(),
			));
		}
		if let Some(digit) = self.weather.incidence_digits.iter().find(|d| **d > 9) {
			return Err(ConfigError::Validation(format!(
				"Weather incidence digit {} is not a decimal digit",
				digit
			)));
		}

		if !(self.delivery_time.average_speed_kmh > 0.0) {
			return Err(ConfigError::Validation(
				"average_speed_kmh must be greater than 0".into(),
			));
		}
		if self.delivery_time.preparation_minutes_per_km < 0.0 {
			return Err(ConfigError::Validation(
				"preparation_minutes_per_km cannot be negative".into(),
			));
		}

		if self.max_batch_size == 0 || self.max_batch_size > 100 {
			return Err(ConfigError::Validation(
				"max_batch_size must be between 1 and 100".into(),
			));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	const MINIMAL: &str = r#"
[service]
id = "test-service"

[distance]
primary = "simulated"
[distance.implementations.simulated]
seed = 7
"#;

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.service.id, "test-service");
		assert_eq!(config.fees.min_fee, dec!(2.00));
		assert_eq!(config.fees.max_fee, dec!(25.00));
		assert_eq!(config.fees.max_radius_km, 30.0);
		assert_eq!(config.fees.distance_bands.len(), 4);
		assert_eq!(config.fees.distance_bands[1].fee, dec!(1.50));
		assert_eq!(config.fees.beyond_fee, dec!(8.00));
		assert_eq!(config.fees.peak_hour.weekday_windows[0].to_string(), "11:30-14:00");
		assert_eq!(config.fees.weather.incidence_digits, vec![0, 1]);
		assert_eq!(config.fees.delivery_time.average_speed_kmh, 22.0);
		assert!(config.catalog.restaurants.is_empty());
	}

	#[test]
	fn test_full_fees_section() {
		let config_str = r#"
[service]
id = "test-service"

[fees]
min_fee = "3.00"
max_fee = 20
max_radius_km = 25.0
beyond_fee = "9.00"

[[fees.distance_bands]]
up_to_km = 5.0
fee = "0"

[[fees.distance_bands]]
up_to_km = 10.0
fee = "2.50"

[fees.peak_hour]
surcharge = "3.00"
weekday_windows = ["12:00-13:00"]
weekend_windows = []

[fees.weather]
surcharge = "1.00"
incidence_digits = [9]

[distance]
primary = "fixed"
[distance.implementations.fixed]
distance_km = 4.0

[[catalog.restaurants]]
id = 1
name = "Pizzaria"
base_fee = "5.00"

[[catalog.restaurants]]
id = 2
name = "Sushi"
active = false
base_fee = "7.50"
"#;
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.fees.min_fee, dec!(3.00));
		assert_eq!(config.fees.max_fee, dec!(20));
		assert_eq!(config.fees.distance_bands.len(), 2);
		assert!(config.fees.peak_hour.weekend_windows.is_empty());
		assert_eq!(config.fees.weather.incidence_digits, vec![9]);
		assert_eq!(config.catalog.restaurants.len(), 2);
		assert!(!config.catalog.restaurants[1].active);
		// untouched sections keep their defaults
		assert_eq!(config.fees.delivery_time.base_preparation_minutes, 15);
	}

	#[test]
	fn test_min_above_max_rejected() {
		let config_str = format!("{}\n[fees]\nmin_fee = \"30\"\n", MINIMAL);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("cannot exceed max_fee"));
	}

	#[test]
	fn test_unordered_bands_rejected() {
		let config_str = format!(
			"{}\n[[fees.distance_bands]]\nup_to_km = 7.0\nfee = \"1\"\n[[fees.distance_bands]]\nup_to_km = 3.0\nfee = \"2\"\n",
			MINIMAL
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("strictly increasing"));
	}

	#[test]
	fn test_decreasing_band_fees_rejected() {
		let config_str = format!(
			"{}\n[[fees.distance_bands]]\nup_to_km = 3.0\nfee = \"2\"\n[[fees.distance_bands]]\nup_to_km = 7.0\nfee = \"1\"\n",
			MINIMAL
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("must not decrease"));
	}

	#[test]
	fn test_invalid_window_rejected() {
		let config_str = format!(
			"{}\n[fees.peak_hour]\nweekday_windows = [\"14:00-11:30\"]\n",
			MINIMAL
		);
		assert!(config_str.parse::<Config>().is_err());
	}

	#[test]
	fn test_incidence_digit_out_of_range() {
		let config_str = format!("{}\n[fees.weather]\nincidence_digits = [10]\n", MINIMAL);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("not a decimal digit"));
	}

	#[test]
	fn test_missing_primary_estimator() {
		let config_str = r#"
[service]
id = "test-service"

[distance]
primary = "geocoder"
[distance.implementations.simulated]
"#;
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err
			.to_string()
			.contains("Primary distance estimator 'geocoder' not found"));
	}

	#[test]
	fn test_duplicate_restaurant_rejected() {
		let config_str = format!(
			"{}\n[[catalog.restaurants]]\nid = 1\nname = \"A\"\nbase_fee = \"1\"\n[[catalog.restaurants]]\nid = 1\nname = \"B\"\nbase_fee = \"2\"\n",
			MINIMAL
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Duplicate restaurant id 1"));
	}

	#[test]
	fn test_batch_size_bounds() {
		let config_str = format!("{}\n[fees]\nmax_batch_size = 0\n", MINIMAL);
		assert!(config_str.parse::<Config>().is_err());
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("DELIVERY_TEST_HOST", "localhost");
		std::env::set_var("DELIVERY_TEST_PORT", "5432");

		let input = "host = \"${DELIVERY_TEST_HOST}:${DELIVERY_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("DELIVERY_TEST_HOST");
		std::env::remove_var("DELIVERY_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${DELIVERY_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${DELIVERY_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("DELIVERY_MISSING_VAR"));
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("DELIVERY_TEST_SERVICE_ID", "from-env");

		let config_str = r#"
[service]
id = "${DELIVERY_TEST_SERVICE_ID}"

[fees]
max_fee = "${DELIVERY_TEST_MAX_FEE:-18.00}"

[distance]
primary = "simulated"
[distance.implementations.simulated]
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.service.id, "from-env");
		assert_eq!(config.fees.max_fee, dec!(18.00));

		std::env::remove_var("DELIVERY_TEST_SERVICE_ID");
	}
}

//! Delivery fee engine.
//!
//! This crate turns a restaurant snapshot and a raw destination code into a
//! [`FeeBreakdown`](delivery_types::FeeBreakdown). Distance estimation is
//! pluggable through the [`DistanceEstimator`] trait, and the current time is
//! read through a [`Clock`] so calculations can be pinned in tests.

use delivery_catalog::CatalogError;
use delivery_config::DistanceConfig;
use delivery_types::{ConfigSchema, DestinationCode, ImplementationRegistry, Restaurant, RestaurantId};
use std::sync::Arc;
use thiserror::Error;

pub mod batch;
pub mod calculator;
pub mod clock;
pub mod policy;

/// Re-export implementations
pub mod implementations {
	pub mod fixed;
	pub mod simulated;
}

pub use batch::{BatchFees, BatchSummary};
pub use calculator::FeeCalculator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use policy::{DeliveryTimeModel, DistanceBands, FeeSettings, PeakHourPolicy, WeatherPolicy};

/// Errors that can occur while estimating a distance.
#[derive(Debug, Error)]
pub enum DistanceError {
	/// The estimator cannot answer for this destination.
	#[error("Destination not supported: {0}")]
	Unsupported(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Errors that can occur during fee calculation.
#[derive(Debug, Error)]
pub enum FeeError {
	/// The restaurant id is unknown to the catalog.
	#[error("Restaurant not found: {0}")]
	RestaurantNotFound(RestaurantId),
	/// Distance estimation failed.
	#[error("Distance estimation failed: {0}")]
	Distance(#[from] DistanceError),
	/// Restaurant lookup failed.
	#[error("Catalog error: {0}")]
	Catalog(#[from] CatalogError),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for distance estimators.
///
/// Implementations answer how far a destination is from a restaurant, in
/// kilometers. The bundled estimators are stand-ins for a real geocoding
/// integration.
pub trait DistanceEstimator: Send + Sync {
	/// Name of the implementation, as used in configuration.
	fn name(&self) -> &'static str;

	/// Returns the configuration schema for this estimator.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Estimates the distance between a restaurant and a destination.
	fn estimate_km(
		&self,
		restaurant: &Restaurant,
		destination: &DestinationCode,
	) -> Result<f64, DistanceError>;
}

/// Type alias for distance estimator factory functions.
pub type DistanceEstimatorFactory =
	fn(&toml::Value) -> Result<Box<dyn DistanceEstimator>, DistanceError>;

/// Registry trait for distance estimator implementations.
pub trait DistanceEstimatorRegistry:
	ImplementationRegistry<Factory = DistanceEstimatorFactory>
{
}

/// Get all registered distance estimator implementations.
///
/// Returns a vector of (name, factory) tuples for all available estimators.
pub fn get_all_implementations() -> Vec<(&'static str, DistanceEstimatorFactory)> {
	use implementations::{fixed, simulated};

	vec![
		(simulated::Registry::NAME, simulated::Registry::factory()),
		(fixed::Registry::NAME, fixed::Registry::factory()),
	]
}

/// Builds the primary estimator named in the distance configuration.
pub fn create_estimator(config: &DistanceConfig) -> Result<Arc<dyn DistanceEstimator>, DistanceError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == config.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			DistanceError::Configuration(format!(
				"Unknown distance estimator '{}'",
				config.primary
			))
		})?;

	let empty = toml::Value::Table(toml::map::Map::new());
	let raw = config.implementations.get(&config.primary).unwrap_or(&empty);
	let estimator = factory(raw)?;
	estimator
		.config_schema()
		.validate(raw)
		.map_err(|e| DistanceError::Configuration(format!("{}: {}", config.primary, e)))?;
	tracing::info!(estimator = estimator.name(), "Loaded distance estimator");
	Ok(Arc::from(estimator))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn test_registered_implementations() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["simulated", "fixed"]);
	}

	#[test]
	fn test_create_primary_estimator() {
		let mut implementations = HashMap::new();
		implementations.insert("fixed".to_string(), toml::from_str("distance_km = 4.5").unwrap());
		let config = DistanceConfig {
			primary: "fixed".to_string(),
			implementations,
		};

		let estimator = create_estimator(&config).unwrap();
		assert_eq!(estimator.name(), "fixed");
	}

	#[test]
	fn test_create_estimator_validates_schema() {
		let fixed = |raw: &str| DistanceConfig {
			primary: "fixed".to_string(),
			implementations: HashMap::from([("fixed".to_string(), toml::from_str(raw).unwrap())]),
		};

		let err = create_estimator(&fixed("distance_km = -1.0")).err().expect("expected configuration error");
		assert!(matches!(
			&err,
			DistanceError::Configuration(msg) if msg.starts_with("fixed: ") && msg.contains("distance_km")
		));
		assert!(create_estimator(&fixed("distance_km = 0.0")).is_ok());

		let simulated = DistanceConfig {
			primary: "simulated".to_string(),
			implementations: HashMap::new(),
		};
		assert_eq!(create_estimator(&simulated).unwrap().name(), "simulated");
	}

	#[test]
	fn test_unknown_estimator_rejected() {
		let config = DistanceConfig {
			primary: "geocoder".to_string(),
			implementations: HashMap::new(),
		};
		assert!(matches!(
			create_estimator(&config),
			Err(DistanceError::Configuration(_))
		));
	}
}

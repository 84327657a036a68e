//! Fixed distance estimator.
//!
//! Answers the same configured distance for every restaurant and destination.
//! Intended for demos and deterministic tests.

use crate::{DistanceError, DistanceEstimator, DistanceEstimatorFactory, DistanceEstimatorRegistry};
use delivery_types::{
	ConfigSchema, DestinationCode, Field, FieldType, ImplementationRegistry, Restaurant, Schema,
	ValidationError,
};
use serde::Deserialize;

/// Configuration for the fixed estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct FixedConfig {
	pub distance_km: f64,
}

/// Configuration schema for the fixed estimator.
pub struct FixedSchema;

impl ConfigSchema for FixedSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new(
				"distance_km",
				FieldType::Float {
					min: Some(0.0),
					max: None,
				},
			)],
			vec![],
		);
		schema.validate(config)
	}
}

/// Estimator returning a constant distance.
pub struct FixedDistanceEstimator {
	distance_km: f64,
}

impl FixedDistanceEstimator {
	pub fn new(distance_km: f64) -> Self {
		Self { distance_km }
	}
}

impl DistanceEstimator for FixedDistanceEstimator {
	fn name(&self) -> &'static str {
		Registry::NAME
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FixedSchema)
	}

	fn estimate_km(
		&self,
		_restaurant: &Restaurant,
		_destination: &DestinationCode,
	) -> Result<f64, DistanceError> {
		Ok(self.distance_km)
	}
}

/// Registry for the fixed estimator implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "fixed";
	type Factory = DistanceEstimatorFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn DistanceEstimator>, DistanceError> {
			let config: FixedConfig = config.clone().try_into().map_err(|e| {
				DistanceError::Configuration(format!("Invalid fixed config: {}", e))
			})?;
			Ok(Box::new(FixedDistanceEstimator::new(config.distance_km)))
		}
	}
}

impl DistanceEstimatorRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	#[test]
	fn test_returns_configured_distance() {
		let factory = Registry::factory();
		let config: toml::Value = toml::from_str("distance_km = 12.5").unwrap();
		let estimator = factory(&config).unwrap();

		let restaurant = Restaurant::new(1, "Test", dec!(5.00));
		let code = DestinationCode::parse("01310-100").unwrap();
		assert_eq!(estimator.estimate_km(&restaurant, &code).unwrap(), 12.5);
	}

	#[test]
	fn test_schema_requires_distance() {
		let factory = Registry::factory();
		let missing: toml::Value = toml::from_str("other = 1").unwrap();
		assert!(matches!(
			factory(&missing),
			Err(DistanceError::Configuration(msg)) if msg.contains("distance_km")
		));

		let negative: toml::Value = toml::from_str("distance_km = -2.0").unwrap();
		assert!(factory(&negative).unwrap().config_schema().validate(&negative).is_err());
	}

	#[test]
	fn test_integer_distance_accepted() {
		let factory = Registry::factory();
		let config: toml::Value = toml::from_str("distance_km = 3").unwrap();
		assert!(FixedSchema.validate(&config).is_ok());
		assert!(factory(&config).is_ok());
	}
}

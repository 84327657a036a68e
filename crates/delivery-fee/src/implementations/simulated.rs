//! Simulated distance estimator.
//!
//! Produces plausible distances from the shape of the destination code alone.
//! The first two digits select a postal region with its own distance range,
//! and the last three digits adjust for neighborhood density. The random part
//! of each draw is seeded from the inputs, so the same restaurant and code
//! always give the same distance.

use crate::{DistanceError, DistanceEstimator, DistanceEstimatorFactory, DistanceEstimatorRegistry};
use delivery_types::{
	ConfigSchema, DestinationCode, Field, FieldType, ImplementationRegistry, Restaurant, Schema,
	ValidationError,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// Configuration for the simulated estimator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulatedConfig {
	/// Mixed into every draw; change it to get a different but stable world.
	#[serde(default)]
	pub seed: u64,
}

/// Configuration schema for the simulated estimator.
pub struct SimulatedSchema;

impl ConfigSchema for SimulatedSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new(
				"seed",
				FieldType::Integer {
					min: Some(0),
					max: None,
				},
			)],
		);
		schema.validate(config)
	}
}

/// Base distance and random spread, in kilometers, for a region prefix.
fn region_range(prefix: u8) -> (f64, f64) {
	match prefix {
		1..=5 => (2.0, 3.0),
		6..=9 => (5.0, 5.0),
		10..=13 => (8.0, 7.0),
		14..=17 => (12.0, 8.0),
		20..=23 => (15.0, 10.0),
		30..=32 => (18.0, 7.0),
		40..=42 => (20.0, 8.0),
		50..=52 => (22.0, 6.0),
		60..=61 => (25.0, 5.0),
		70..=72 => (28.0, 4.0),
		80..=82 => (24.0, 6.0),
		90..=92 => (26.0, 7.0),
		_ => (15.0, 10.0),
	}
}

/// Multiplier for the neighborhood density encoded in the last digits.
fn density_factor(suffix: u16) -> f64 {
	match suffix % 100 {
		0..=19 => 0.8,
		81..=99 => 1.3,
		_ => 1.0,
	}
}

fn round_one_decimal(km: f64) -> f64 {
	(km * 10.0).round() / 10.0
}

/// Distance estimator driven by the destination code shape.
pub struct SimulatedDistanceEstimator {
	config: SimulatedConfig,
}

impl SimulatedDistanceEstimator {
	/// Creates a new simulated estimator.
	pub fn new(config: SimulatedConfig) -> Self {
		Self { config }
	}

	fn seed_for(&self, restaurant: &Restaurant, destination: &DestinationCode) -> u64 {
		self.config
			.seed
			.wrapping_mul(0x9E37_79B9_7F4A_7C15)
			.wrapping_add(restaurant.id)
			.rotate_left(32)
			^ u64::from(destination.numeric_value())
	}
}

impl DistanceEstimator for SimulatedDistanceEstimator {
	fn name(&self) -> &'static str {
		Registry::NAME
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(SimulatedSchema)
	}

	fn estimate_km(
		&self,
		restaurant: &Restaurant,
		destination: &DestinationCode,
	) -> Result<f64, DistanceError> {
		let mut rng = StdRng::seed_from_u64(self.seed_for(restaurant, destination));
		let (base, spread) = region_range(destination.region_prefix());
		let km = (base + rng.gen_range(0.0..spread))
			* density_factor(destination.neighborhood_suffix());

		Ok(round_one_decimal(km))
	}
}

/// Registry for the simulated estimator implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "simulated";
	type Factory = DistanceEstimatorFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn DistanceEstimator>, DistanceError> {
			let config: SimulatedConfig = config.clone().try_into().map_err(|e| {
				DistanceError::Configuration(format!("Invalid simulated config: {}", e))
			})?;
			Ok(Box::new(SimulatedDistanceEstimator::new(config)))
		}
	}
}

impl DistanceEstimatorRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	fn restaurant(id: u64) -> Restaurant {
		Restaurant::new(id, "Test", dec!(5.00))
	}

	fn estimate(id: u64, code: &str) -> f64 {
		let estimator = SimulatedDistanceEstimator::new(SimulatedConfig::default());
		let code = DestinationCode::parse(code).unwrap();
		estimator.estimate_km(&restaurant(id), &code).unwrap()
	}

	#[test]
	fn test_same_inputs_same_distance() {
		assert_eq!(estimate(1, "01310-100"), estimate(1, "01310100"));
	}

	#[test]
	fn test_dense_central_region_stays_close() {
		// Region 01, suffix 100 -> 0 mod 100, so 0.8 x [2, 5).
		for id in 1..50 {
			let km = estimate(id, "01310-100");
			assert!((1.6..=4.0).contains(&km), "got {km}");
		}
	}

	#[test]
	fn test_sparse_far_region_can_exceed_radius() {
		// Region 70, suffix 190 -> 90 mod 100, so 1.3 x [28, 32).
		for id in 1..50 {
			let km = estimate(id, "70000-190");
			assert!((36.4..=41.6).contains(&km), "got {km}");
		}
	}

	#[test]
	fn test_unlisted_region_uses_default_range() {
		// Region 25 is not in the table, suffix 150 -> 50 mod 100 keeps 1.0.
		for id in 1..50 {
			let km = estimate(id, "25000-150");
			assert!((15.0..=25.0).contains(&km), "got {km}");
		}
	}

	#[test]
	fn test_rounded_to_one_decimal() {
		let km = estimate(7, "04538-133");
		assert!(((km * 10.0).round() - km * 10.0).abs() < 1e-9);
	}

	#[test]
	fn test_density_factor() {
		assert_eq!(density_factor(119), 0.8);
		assert_eq!(density_factor(20), 1.0);
		assert_eq!(density_factor(80), 1.0);
		assert_eq!(density_factor(981), 1.3);
	}

	#[test]
	fn test_factory_rejects_negative_seed() {
		let factory = Registry::factory();
		let config: toml::Value = toml::from_str("seed = -1").unwrap();
		assert!(factory(&config).is_err());
		let config: toml::Value = toml::from_str("seed = 42").unwrap();
		assert_eq!(factory(&config).unwrap().name(), "simulated");
	}
}

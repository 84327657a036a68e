//! Configuration builder for creating test and development configurations.
//!
//! This module provides utilities for constructing Config instances with
//! sensible defaults, particularly useful for testing scenarios.

use crate::{CatalogConfig, Config, DistanceConfig, FeesConfig, ServiceConfig};
use delivery_types::Restaurant;
use std::collections::HashMap;

/// Builder for creating `Config` instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	service_id: String,
	fees: FeesConfig,
	distance_primary: String,
	distance_implementations: HashMap<String, toml::Value>,
	restaurants: Vec<Restaurant>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` using the simulated estimator and default fees.
	pub fn new() -> Self {
		let mut distance_implementations = HashMap::new();
		distance_implementations.insert(
			"simulated".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);
		Self {
			service_id: "test-service".to_string(),
			fees: FeesConfig::default(),
			distance_primary: "simulated".to_string(),
			distance_implementations,
			restaurants: Vec::new(),
		}
	}

	/// Sets the service ID.
	pub fn service_id(mut self, id: impl Into<String>) -> Self {
		self.service_id = id.into();
		self
	}

	/// Replaces the fee settings.
	pub fn fees(mut self, fees: FeesConfig) -> Self {
		self.fees = fees;
		self
	}

	/// Uses the fixed estimator with the given distance as primary.
	pub fn fixed_distance(mut self, distance_km: f64) -> Self {
		let mut table = toml::map::Map::new();
		table.insert("distance_km".to_string(), toml::Value::Float(distance_km));
		self.distance_implementations
			.insert("fixed".to_string(), toml::Value::Table(table));
		self.distance_primary = "fixed".to_string();
		self
	}

	/// Adds a restaurant to the catalog.
	pub fn restaurant(mut self, restaurant: Restaurant) -> Self {
		self.restaurants.push(restaurant);
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		Config {
			service: ServiceConfig {
				id: self.service_id,
			},
			fees: self.fees,
			distance: DistanceConfig {
				primary: self.distance_primary,
				implementations: self.distance_implementations,
			},
			catalog: CatalogConfig {
				restaurants: self.restaurants,
			},
		}
	}
}

//! In-memory restaurant catalog.
//!
//! Useful for the CLI and for tests, where the catalog is seeded from the
//! configuration file and never persisted.

use crate::{CatalogError, RestaurantLookup};
use dashmap::DashMap;
use delivery_config::CatalogConfig;
use delivery_types::{Restaurant, RestaurantId};

/// In-memory catalog backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
	restaurants: DashMap<RestaurantId, Restaurant>,
}

impl MemoryCatalog {
	/// Creates an empty catalog.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a catalog seeded with the configured restaurants.
	pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
		let catalog = Self::new();
		for restaurant in &config.restaurants {
			catalog.insert(restaurant.clone())?;
		}
		tracing::debug!(count = catalog.len(), "Seeded restaurant catalog");
		Ok(catalog)
	}

	/// Adds a restaurant, rejecting duplicate ids.
	pub fn insert(&self, restaurant: Restaurant) -> Result<(), CatalogError> {
		match self.restaurants.entry(restaurant.id) {
			dashmap::mapref::entry::Entry::Occupied(_) => {
				Err(CatalogError::Duplicate(restaurant.id))
			},
			dashmap::mapref::entry::Entry::Vacant(slot) => {
				slot.insert(restaurant);
				Ok(())
			},
		}
	}

	/// Number of restaurants in the catalog.
	pub fn len(&self) -> usize {
		self.restaurants.len()
	}

	/// Whether the catalog is empty.
	pub fn is_empty(&self) -> bool {
		self.restaurants.is_empty()
	}
}

impl RestaurantLookup for MemoryCatalog {
	fn find_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, CatalogError> {
		Ok(self.restaurants.get(&id).map(|entry| entry.value().clone()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	#[test]
	fn test_basic_operations() {
		let catalog = MemoryCatalog::new();
		catalog
			.insert(Restaurant::new(1, "Pizzaria", dec!(5.00)))
			.unwrap();

		let found = catalog.find_restaurant(1).unwrap().unwrap();
		assert_eq!(found.name, "Pizzaria");
		assert!(catalog.find_restaurant(2).unwrap().is_none());

		let duplicate = catalog.insert(Restaurant::new(1, "Other", dec!(1.00)));
		assert!(matches!(duplicate, Err(CatalogError::Duplicate(1))));
	}

	#[test]
	fn test_from_config_rejects_duplicate_ids() {
		let config = CatalogConfig {
			restaurants: vec![
				Restaurant::new(1, "Pizzaria", dec!(5.00)),
				Restaurant::new(1, "Pizzaria", dec!(5.00)).deactivated(),
			],
		};
		assert!(matches!(
			MemoryCatalog::from_config(&config),
			Err(CatalogError::Duplicate(1))
		));
	}

	#[test]
	fn test_from_config() {
		let config = CatalogConfig {
			restaurants: vec![
				Restaurant::new(1, "Pizzaria", dec!(5.00)),
				Restaurant::new(2, "Sushi", dec!(7.50)),
			],
		};
		let catalog = MemoryCatalog::from_config(&config).unwrap();
		assert_eq!(catalog.len(), 2);
		assert_eq!(
			catalog.find_restaurant(2).unwrap().unwrap().base_fee,
			dec!(7.50)
		);
	}
}

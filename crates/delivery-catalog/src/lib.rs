//! Restaurant catalog module for the delivery fee system.
//!
//! The fee engine never talks to persistence directly. It asks a
//! [`RestaurantLookup`] for a restaurant snapshot by id, and this crate
//! provides that seam together with an in-memory implementation seeded from
//! configuration.

use delivery_types::{Restaurant, RestaurantId};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

pub use implementations::memory::MemoryCatalog;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
	/// Error that occurs in the catalog backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs when a record conflicts with an existing one.
	#[error("Restaurant {0} already exists")]
	Duplicate(RestaurantId),
}

/// Read access to restaurant snapshots.
///
/// `Ok(None)` means the restaurant does not exist; `Err` means the lookup
/// itself failed.
pub trait RestaurantLookup: Send + Sync {
	/// Finds a restaurant by id.
	fn find_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, CatalogError>;
}

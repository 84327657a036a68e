//! Restaurant snapshot types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a restaurant in the catalog.
pub type RestaurantId = u64;

/// Read-only snapshot of a restaurant as seen by the fee engine.
///
/// The catalog owns the record; the fee engine only reads the fields it
/// needs to price a delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
	/// Unique identifier of the restaurant.
	pub id: RestaurantId,
	/// Display name.
	pub name: String,
	/// Whether the restaurant currently accepts orders.
	#[serde(default = "default_active")]
	pub active: bool,
	/// Base delivery fee configured by the restaurant.
	pub base_fee: Decimal,
}

fn default_active() -> bool {
	true
}

impl Restaurant {
	/// Creates an active restaurant with the given base fee.
	pub fn new(id: RestaurantId, name: impl Into<String>, base_fee: Decimal) -> Self {
		Self {
			id,
			name: name.into(),
			active: true,
			base_fee,
		}
	}

	/// Returns a copy of this restaurant marked inactive.
	pub fn deactivated(mut self) -> Self {
		self.active = false;
		self
	}
}

//! Views over the result of a multi-restaurant fee calculation.

use delivery_types::{format_brl, FeeBreakdown, RestaurantId};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fees for one destination across several restaurants.
///
/// Holds exactly one entry per distinct requested id, available or not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFees {
	destination_code: String,
	entries: BTreeMap<RestaurantId, FeeBreakdown>,
}

/// Restaurant id paired with its total fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedRestaurant {
	pub restaurant_id: RestaurantId,
	pub total_fee: Decimal,
}

/// Aggregate figures for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
	pub destination_code: String,
	pub total_queried: usize,
	pub total_available: usize,
	pub cheapest: Option<PricedRestaurant>,
	pub most_expensive: Option<PricedRestaurant>,
	/// Difference between the most expensive and the cheapest total.
	pub max_savings: Decimal,
}

impl BatchSummary {
	/// One-line human readable description of the batch.
	pub fn describe(&self) -> String {
		match (&self.cheapest, &self.most_expensive) {
			(Some(cheapest), Some(most_expensive)) => format!(
				"{} of {} restaurants deliver to {}. Fees range from {} to {}",
				self.total_available,
				self.total_queried,
				self.destination_code,
				format_brl(cheapest.total_fee),
				format_brl(most_expensive.total_fee),
			),
			_ => format!(
				"None of the {} restaurants deliver to {}",
				self.total_queried, self.destination_code
			),
		}
	}
}

impl BatchFees {
	pub(crate) fn new(
		destination_code: String,
		entries: BTreeMap<RestaurantId, FeeBreakdown>,
	) -> Self {
		Self {
			destination_code,
			entries,
		}
	}

	pub fn entries(&self) -> &BTreeMap<RestaurantId, FeeBreakdown> {
		&self.entries
	}

	pub fn get(&self, restaurant_id: RestaurantId) -> Option<&FeeBreakdown> {
		self.entries.get(&restaurant_id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn available(&self) -> impl Iterator<Item = &FeeBreakdown> {
		self.entries.values().filter(|fee| fee.available)
	}

	/// Available entries, cheapest first. Ties keep ascending id order.
	pub fn sorted_by_total(&self) -> Vec<&FeeBreakdown> {
		let mut fees: Vec<_> = self.available().collect();
		// Stable sort over id-ordered input.
		fees.sort_by_key(|fee| fee.total_fee);
		fees
	}

	/// Available entries whose earliest arrival is under `threshold_minutes`.
	pub fn fast_deliveries(&self, threshold_minutes: u32) -> Vec<&FeeBreakdown> {
		self.available()
			.filter(|fee| fee.is_fast(threshold_minutes))
			.collect()
	}

	pub fn summary(&self) -> BatchSummary {
		let sorted = self.sorted_by_total();
		let priced = |fee: &&FeeBreakdown| PricedRestaurant {
			restaurant_id: fee.restaurant_id,
			total_fee: fee.total_fee,
		};
		let cheapest = sorted.first().map(priced);
		let most_expensive = sorted.last().map(priced);
		let max_savings = match (&cheapest, &most_expensive) {
			(Some(low), Some(high)) => high.total_fee - low.total_fee,
			_ => Decimal::ZERO,
		};

		BatchSummary {
			destination_code: self.destination_code.clone(),
			total_queried: self.entries.len(),
			total_available: sorted.len(),
			cheapest,
			most_expensive,
			max_savings,
		}
	}
}

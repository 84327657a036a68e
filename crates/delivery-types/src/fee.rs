//! Fee breakdown types produced by the fee engine.
//!
//! A [`FeeBreakdown`] is created for every calculation request and handed back
//! to the caller. It is never mutated or persisted by the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{format_brl, RestaurantId};

/// Estimated delivery time range in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryWindow {
	/// Earliest expected arrival, in minutes.
	pub min_minutes: u32,
	/// Latest expected arrival, in minutes.
	pub max_minutes: u32,
}

impl DeliveryWindow {
	/// Returns true when the earliest arrival is below `threshold_minutes`.
	pub fn is_fast(&self, threshold_minutes: u32) -> bool {
		self.min_minutes < threshold_minutes
	}
}

impl fmt::Display for DeliveryWindow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{} min", self.min_minutes, self.max_minutes)
	}
}

/// Result of a delivery fee calculation.
///
/// When `available` is false the breakdown carries an `unavailable_reason`
/// and every monetary field is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
	/// Restaurant the fee was computed for.
	pub restaurant_id: RestaurantId,
	/// Restaurant display name, when the restaurant was resolved.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub restaurant_name: Option<String>,
	/// Destination code in canonical form (raw input if it did not parse).
	pub destination_code: String,
	/// The restaurant's own base fee.
	pub base_fee: Decimal,
	/// Surcharge selected by the distance band.
	pub distance_fee: Decimal,
	/// Surcharge for peak ordering hours.
	pub peak_hour_fee: Decimal,
	/// Surcharge for adverse weather.
	pub weather_fee: Decimal,
	/// Sum of all components, clamped to the configured bounds.
	pub total_fee: Decimal,
	/// Estimated distance from the restaurant to the destination.
	pub distance_km: f64,
	/// Estimated delivery time range.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimated_time: Option<DeliveryWindow>,
	/// Whether delivery is possible.
	pub available: bool,
	/// Why delivery is not possible.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub unavailable_reason: Option<String>,
	/// Human readable remarks about applied surcharges.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub notes: Vec<String>,
	/// When the calculation was performed.
	pub calculated_at: DateTime<Utc>,
}

impl FeeBreakdown {
	/// Builds an unavailable breakdown with all money fields zeroed.
	pub fn unavailable(
		restaurant_id: RestaurantId,
		destination_code: impl Into<String>,
		reason: impl Into<String>,
		calculated_at: DateTime<Utc>,
	) -> Self {
		Self {
			restaurant_id,
			restaurant_name: None,
			destination_code: destination_code.into(),
			base_fee: Decimal::ZERO,
			distance_fee: Decimal::ZERO,
			peak_hour_fee: Decimal::ZERO,
			weather_fee: Decimal::ZERO,
			total_fee: Decimal::ZERO,
			distance_km: 0.0,
			estimated_time: None,
			available: false,
			unavailable_reason: Some(reason.into()),
			notes: Vec::new(),
			calculated_at,
		}
	}

	/// Attaches the restaurant name to the breakdown.
	pub fn with_restaurant_name(mut self, name: impl Into<String>) -> Self {
		self.restaurant_name = Some(name.into());
		self
	}

	/// Sum of the distance, peak-hour and weather surcharges.
	pub fn surcharges(&self) -> Decimal {
		self.distance_fee + self.peak_hour_fee + self.weather_fee
	}

	/// Deliveries further than 10 km.
	pub fn is_long_distance(&self) -> bool {
		self.distance_km > 10.0
	}

	/// Available deliveries expected to start arriving before the threshold.
	pub fn is_fast(&self, threshold_minutes: u32) -> bool {
		self.available
			&& self
				.estimated_time
				.is_some_and(|window| window.is_fast(threshold_minutes))
	}

	/// Total fee formatted as Brazilian currency.
	pub fn formatted_total(&self) -> String {
		format_brl(self.total_fee)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	#[test]
	fn test_unavailable_zeroes_money() {
		let fee = FeeBreakdown::unavailable(3, "01310-100", "closed", Utc::now());
		assert!(!fee.available);
		assert_eq!(fee.unavailable_reason.as_deref(), Some("closed"));
		assert_eq!(fee.total_fee, Decimal::ZERO);
		assert_eq!(fee.surcharges(), Decimal::ZERO);
		assert!(!fee.is_fast(30));
	}

	#[test]
	fn test_window_display_and_speed() {
		let window = DeliveryWindow {
			min_minutes: 25,
			max_minutes: 50,
		};
		assert_eq!(window.to_string(), "25-50 min");
		assert!(window.is_fast(30));
		assert!(!window.is_fast(25));
	}

	#[test]
	fn test_json_shape() {
		let mut fee = FeeBreakdown::unavailable(1, "01310-100", "closed", Utc::now());
		fee.total_fee = dec!(8.50);
		let json = serde_json::to_value(&fee).unwrap();
		assert_eq!(json["restaurantId"], 1);
		assert_eq!(json["destinationCode"], "01310-100");
		assert_eq!(json["unavailableReason"], "closed");
		assert!(json.get("estimatedTime").is_none());
		assert_eq!(fee.formatted_total(), "R$ 8,50");
	}
}

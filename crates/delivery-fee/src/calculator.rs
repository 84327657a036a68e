//! Delivery fee calculation.
//!
//! The calculator composes a fee from the restaurant's base fee and three
//! surcharges (distance band, peak hour, weather), clamps the total into the
//! configured bounds and estimates a delivery window. Restaurants that cannot
//! deliver produce an unavailable breakdown instead of an error.

use crate::batch::BatchFees;
use crate::clock::{Clock, SystemClock};
use crate::policy::FeeSettings;
use crate::{create_estimator, DistanceError, DistanceEstimator, FeeError};
use delivery_catalog::RestaurantLookup;
use delivery_config::Config;
use delivery_types::{format_km, DestinationCode, FeeBreakdown, Restaurant, RestaurantId};
use std::collections::BTreeMap;
use std::sync::Arc;

const REASON_INACTIVE: &str = "restaurant temporarily unavailable";
const REASON_INVALID_CODE: &str = "invalid or missing postal code";

/// Computes delivery fees for single restaurants and batches.
pub struct FeeCalculator {
	settings: FeeSettings,
	estimator: Arc<dyn DistanceEstimator>,
	clock: Arc<dyn Clock>,
}

// One calculator is shared by every request thread.
const _: () = {
	const fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<FeeCalculator>();
};

impl FeeCalculator {
	pub fn new(
		settings: FeeSettings,
		estimator: Arc<dyn DistanceEstimator>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			settings,
			estimator,
			clock,
		}
	}

	/// Builds a calculator from configuration, using the primary estimator
	/// and the system clock.
	pub fn from_config(config: &Config) -> Result<Self, FeeError> {
		let estimator = create_estimator(&config.distance)?;
		Ok(Self::new(
			FeeSettings::from_config(&config.fees),
			estimator,
			Arc::new(SystemClock),
		))
	}

	pub fn settings(&self) -> &FeeSettings {
		&self.settings
	}

	/// Calculates the fee for one restaurant.
	///
	/// `restaurant` is the catalog lookup result for `restaurant_id`; `None`
	/// fails with [`FeeError::RestaurantNotFound`]. Inactive restaurants,
	/// malformed codes and destinations beyond the delivery radius yield an
	/// unavailable breakdown.
	pub fn calculate_fee(
		&self,
		restaurant: Option<&Restaurant>,
		restaurant_id: RestaurantId,
		raw_code: &str,
	) -> Result<FeeBreakdown, FeeError> {
		let restaurant = restaurant.ok_or(FeeError::RestaurantNotFound(restaurant_id))?;
		let calculated_at = self.clock.now_utc();

		tracing::info!(
			restaurant_id,
			destination = raw_code,
			"Calculating delivery fee"
		);

		if !restaurant.active {
			return Ok(FeeBreakdown::unavailable(
				restaurant_id,
				DestinationCode::format_raw(raw_code),
				REASON_INACTIVE,
				calculated_at,
			)
			.with_restaurant_name(&restaurant.name));
		}

		let destination = match DestinationCode::parse(raw_code) {
			Ok(destination) => destination,
			Err(e) => {
				tracing::debug!(restaurant_id, error = %e, "Rejected destination code");
				return Ok(FeeBreakdown::unavailable(
					restaurant_id,
					DestinationCode::format_raw(raw_code),
					REASON_INVALID_CODE,
					calculated_at,
				)
				.with_restaurant_name(&restaurant.name));
			},
		};

		let distance_km = self.estimator.estimate_km(restaurant, &destination)?;
		if !distance_km.is_finite() || distance_km < 0.0 {
			return Err(DistanceError::Unsupported(format!(
				"{} returned an invalid distance for {}",
				self.estimator.name(),
				destination
			))
			.into());
		}

		if distance_km > self.settings.max_radius_km {
			return Ok(FeeBreakdown::unavailable(
				restaurant_id,
				destination.to_string(),
				format!(
					"region too far away ({:.1} km). Maximum: {:.1} km",
					distance_km, self.settings.max_radius_km
				),
				calculated_at,
			)
			.with_restaurant_name(&restaurant.name));
		}

		let now = self.clock.now();
		let distance_fee = self.settings.distance_bands.fee_for(distance_km);
		let peak_hour_fee = self.settings.peak_hour.surcharge_at(now);
		let weather_fee = self.settings.weather.surcharge_for(&destination);
		let total_fee = self.settings.clamp_total(
			restaurant.base_fee + distance_fee + peak_hour_fee + weather_fee,
		);
		let window = self.settings.delivery_time.window_for(distance_km);

		let mut notes = Vec::new();
		if !peak_hour_fee.is_zero() {
			notes.push("peak-hour surcharge applied".to_string());
		}
		if !weather_fee.is_zero() {
			notes.push("weather surcharge applied".to_string());
		}
		if distance_km > self.settings.long_distance_notice_km {
			notes.push("long-distance delivery".to_string());
		}

		tracing::info!(
			restaurant_id,
			destination = %destination,
			distance = %format_km(distance_km),
			total_fee = %total_fee,
			window = %window,
			"Delivery fee calculated"
		);

		Ok(FeeBreakdown {
			restaurant_id,
			restaurant_name: Some(restaurant.name.clone()),
			destination_code: destination.to_string(),
			base_fee: restaurant.base_fee,
			distance_fee,
			peak_hour_fee,
			weather_fee,
			total_fee,
			distance_km,
			estimated_time: Some(window),
			available: true,
			unavailable_reason: None,
			notes,
			calculated_at,
		})
	}

	/// Looks the restaurant up and calculates its fee.
	pub fn calculate_fee_for(
		&self,
		lookup: &dyn RestaurantLookup,
		restaurant_id: RestaurantId,
		raw_code: &str,
	) -> Result<FeeBreakdown, FeeError> {
		let restaurant = lookup.find_restaurant(restaurant_id)?;
		self.calculate_fee(restaurant.as_ref(), restaurant_id, raw_code)
	}

	/// Calculates fees for several restaurants delivering to one destination.
	///
	/// The result holds one entry per distinct id, and an empty list yields an
	/// empty batch. A failure for one id is recorded as an unavailable entry
	/// and never aborts the batch.
	pub fn calculate_fees_for_multiple(
		&self,
		lookup: &dyn RestaurantLookup,
		raw_code: &str,
		restaurant_ids: &[RestaurantId],
	) -> BatchFees {
		tracing::info!(
			destination = raw_code,
			count = restaurant_ids.len(),
			"Calculating fees for multiple restaurants"
		);

		let destination_code = DestinationCode::format_raw(raw_code);
		let mut entries = BTreeMap::new();
		for &restaurant_id in restaurant_ids {
			if entries.contains_key(&restaurant_id) {
				continue;
			}
			let fee = self
				.calculate_fee_for(lookup, restaurant_id, raw_code)
				.unwrap_or_else(|e| {
					tracing::warn!(restaurant_id, error = %e, "Fee calculation failed");
					FeeBreakdown::unavailable(
						restaurant_id,
						destination_code.clone(),
						format!("calculation error: {}", e),
						self.clock.now_utc(),
					)
				});
			entries.insert(restaurant_id, fee);
		}

		BatchFees::new(destination_code, entries)
	}
}

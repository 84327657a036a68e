//! Surcharge and delivery time policies.
//!
//! Each policy is a small value object built from the fee configuration and
//! answers one question about a single calculation. [`FeeSettings`] bundles
//! them together with the clamping bounds and radius.

use chrono::{Datelike, NaiveDateTime, Weekday};
use delivery_config::{
	DeliveryTimeConfig, FeesConfig, PeakHourConfig, TimeWindow, WeatherConfig,
};
use delivery_types::{DeliveryWindow, DestinationCode};
use rust_decimal::Decimal;

/// Distance surcharge bands with an inclusive upper bound each.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceBands {
	bands: Vec<(f64, Decimal)>,
	beyond: Decimal,
}

impl DistanceBands {
	/// Creates bands from `(up_to_km, fee)` pairs sorted by distance.
	pub fn new(bands: Vec<(f64, Decimal)>, beyond: Decimal) -> Self {
		Self { bands, beyond }
	}

	/// Surcharge for a distance; the first band whose bound is not exceeded wins.
	pub fn fee_for(&self, distance_km: f64) -> Decimal {
		self.bands
			.iter()
			.find(|(up_to_km, _)| distance_km <= *up_to_km)
			.map(|(_, fee)| *fee)
			.unwrap_or(self.beyond)
	}
}

/// Flat surcharge applied inside configured time-of-day windows.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakHourPolicy {
	surcharge: Decimal,
	weekday_windows: Vec<TimeWindow>,
	weekend_windows: Vec<TimeWindow>,
}

impl PeakHourPolicy {
	pub fn new(
		surcharge: Decimal,
		weekday_windows: Vec<TimeWindow>,
		weekend_windows: Vec<TimeWindow>,
	) -> Self {
		Self {
			surcharge,
			weekday_windows,
			weekend_windows,
		}
	}

	/// Whether `at` falls in a peak window for its day of the week.
	pub fn is_peak(&self, at: NaiveDateTime) -> bool {
		let windows = match at.weekday() {
			Weekday::Sat | Weekday::Sun => &self.weekend_windows,
			_ => &self.weekday_windows,
		};
		windows.iter().any(|window| window.contains(at.time()))
	}

	/// Surcharge due at `at`, zero outside peak windows.
	pub fn surcharge_at(&self, at: NaiveDateTime) -> Decimal {
		if self.is_peak(at) {
			self.surcharge
		} else {
			Decimal::ZERO
		}
	}
}

impl From<&PeakHourConfig> for PeakHourPolicy {
	fn from(config: &PeakHourConfig) -> Self {
		Self::new(
			config.surcharge,
			config.weekday_windows.clone(),
			config.weekend_windows.clone(),
		)
	}
}

/// Weather surcharge keyed on the destination's last digit.
///
/// Stand-in for a real weather feed: a destination is affected when its last
/// digit belongs to the incidence set.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPolicy {
	surcharge: Decimal,
	incidence_digits: Vec<u8>,
}

impl WeatherPolicy {
	pub fn new(surcharge: Decimal, incidence_digits: Vec<u8>) -> Self {
		Self {
			surcharge,
			incidence_digits,
		}
	}

	pub fn is_affected(&self, destination: &DestinationCode) -> bool {
		self.incidence_digits.contains(&destination.last_digit())
	}

	pub fn surcharge_for(&self, destination: &DestinationCode) -> Decimal {
		if self.is_affected(destination) {
			self.surcharge
		} else {
			Decimal::ZERO
		}
	}
}

impl From<&WeatherConfig> for WeatherPolicy {
	fn from(config: &WeatherConfig) -> Self {
		Self::new(config.surcharge, config.incidence_digits.clone())
	}
}

/// Linear travel plus preparation model for the delivery window.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryTimeModel {
	average_speed_kmh: f64,
	base_preparation_minutes: u32,
	preparation_minutes_per_km: f64,
	lower_slack_minutes: u32,
	upper_slack_minutes: u32,
	minimum_lower_minutes: u32,
}

impl DeliveryTimeModel {
	/// Expected arrival range for a delivery of `distance_km`.
	///
	/// Travel time rounds up to the next minute, preparation time rounds down.
	/// Minute counts saturate at `u32::MAX`.
	pub fn window_for(&self, distance_km: f64) -> DeliveryWindow {
		let distance_km = distance_km.max(0.0);
		let travel = if self.average_speed_kmh > 0.0 {
			(distance_km / self.average_speed_kmh * 60.0).ceil() as u32
		} else {
			0
		};
		let preparation = (f64::from(self.base_preparation_minutes)
			+ self.preparation_minutes_per_km * distance_km)
			.floor() as u32;
		let total = travel.saturating_add(preparation);
		let min_minutes = total
			.saturating_sub(self.lower_slack_minutes)
			.max(self.minimum_lower_minutes);

		DeliveryWindow {
			min_minutes,
			max_minutes: total
				.saturating_add(self.upper_slack_minutes)
				.max(min_minutes),
		}
	}
}

impl From<&DeliveryTimeConfig> for DeliveryTimeModel {
	fn from(config: &DeliveryTimeConfig) -> Self {
		Self {
			average_speed_kmh: config.average_speed_kmh,
			base_preparation_minutes: config.base_preparation_minutes,
			preparation_minutes_per_km: config.preparation_minutes_per_km,
			lower_slack_minutes: config.lower_slack_minutes,
			upper_slack_minutes: config.upper_slack_minutes,
			minimum_lower_minutes: config.minimum_lower_minutes,
		}
	}
}

/// Everything the calculator needs besides the estimator and the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSettings {
	pub min_fee: Decimal,
	pub max_fee: Decimal,
	pub max_radius_km: f64,
	pub distance_bands: DistanceBands,
	pub peak_hour: PeakHourPolicy,
	pub weather: WeatherPolicy,
	pub delivery_time: DeliveryTimeModel,
	/// Lower window bound under which a delivery counts as fast.
	pub fast_delivery_minutes: u32,
	/// Distance above which the breakdown carries a long-distance note.
	pub long_distance_notice_km: f64,
	pub max_batch_size: usize,
}

impl FeeSettings {
	/// Builds settings from the `[fees]` configuration section.
	pub fn from_config(config: &FeesConfig) -> Self {
		Self {
			min_fee: config.min_fee,
			max_fee: config.max_fee,
			max_radius_km: config.max_radius_km,
			distance_bands: DistanceBands::new(
				config
					.distance_bands
					.iter()
					.map(|band| (band.up_to_km, band.fee))
					.collect(),
				config.beyond_fee,
			),
			peak_hour: PeakHourPolicy::from(&config.peak_hour),
			weather: WeatherPolicy::from(&config.weather),
			delivery_time: DeliveryTimeModel::from(&config.delivery_time),
			fast_delivery_minutes: config.fast_delivery_minutes,
			long_distance_notice_km: config.long_distance_notice_km,
			max_batch_size: config.max_batch_size,
		}
	}

	/// Clamps a raw total into `[min_fee, max_fee]`.
	pub fn clamp_total(&self, total: Decimal) -> Decimal {
		total.max(self.min_fee).min(self.max_fee)
	}
}

impl Default for FeeSettings {
	fn default() -> Self {
		Self::from_config(&FeesConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;
	use rust_decimal_macros::dec;

	fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(year, month, day)
			.unwrap()
			.and_hms_opt(hour, minute, 0)
			.unwrap()
	}

	#[test]
	fn test_band_boundaries_are_inclusive() {
		let bands = FeeSettings::default().distance_bands;
		assert_eq!(bands.fee_for(0.0), dec!(0.00));
		assert_eq!(bands.fee_for(3.0), dec!(0.00));
		assert_eq!(bands.fee_for(3.1), dec!(1.50));
		assert_eq!(bands.fee_for(7.0), dec!(1.50));
		assert_eq!(bands.fee_for(12.0), dec!(3.00));
		assert_eq!(bands.fee_for(20.0), dec!(5.00));
		assert_eq!(bands.fee_for(20.1), dec!(8.00));
	}

	#[test]
	fn test_band_fee_is_monotonic() {
		let bands = FeeSettings::default().distance_bands;
		let mut previous = Decimal::ZERO;
		for tenth in 0..=400 {
			let fee = bands.fee_for(f64::from(tenth) / 10.0);
			assert!(fee >= previous, "fee dropped at {} km", f64::from(tenth) / 10.0);
			previous = fee;
		}
	}

	#[test]
	fn test_weekday_peak_windows() {
		let policy = FeeSettings::default().peak_hour;
		// 2024-03-05 is a Tuesday.
		assert_eq!(policy.surcharge_at(at(2024, 3, 5, 11, 29)), dec!(0));
		assert_eq!(policy.surcharge_at(at(2024, 3, 5, 11, 30)), dec!(2.00));
		assert_eq!(policy.surcharge_at(at(2024, 3, 5, 13, 59)), dec!(2.00));
		assert_eq!(policy.surcharge_at(at(2024, 3, 5, 14, 0)), dec!(0));
		assert_eq!(policy.surcharge_at(at(2024, 3, 5, 20, 30)), dec!(2.00));
		assert_eq!(policy.surcharge_at(at(2024, 3, 5, 21, 30)), dec!(0));
	}

	#[test]
	fn test_weekend_peak_windows() {
		let policy = FeeSettings::default().peak_hour;
		// 2024-03-09 is a Saturday, 2024-03-10 a Sunday.
		assert!(!policy.is_peak(at(2024, 3, 9, 11, 45)));
		assert!(policy.is_peak(at(2024, 3, 9, 12, 0)));
		assert!(policy.is_peak(at(2024, 3, 10, 21, 59)));
		assert!(!policy.is_peak(at(2024, 3, 10, 22, 0)));
	}

	#[test]
	fn test_weather_uses_last_digit() {
		let policy = FeeSettings::default().weather;
		let rainy = DestinationCode::parse("01310-101").unwrap();
		let rainy_zero = DestinationCode::parse("01310-100").unwrap();
		let dry = DestinationCode::parse("01310-102").unwrap();
		assert_eq!(policy.surcharge_for(&rainy), dec!(1.50));
		assert_eq!(policy.surcharge_for(&rainy_zero), dec!(1.50));
		assert_eq!(policy.surcharge_for(&dry), dec!(0));
	}

	#[test]
	fn test_delivery_window() {
		let model = FeeSettings::default().delivery_time;
		// 2 km: travel ceil(5.45) = 6, prep 19, total 25.
		assert_eq!(
			model.window_for(2.0),
			DeliveryWindow {
				min_minutes: 15,
				max_minutes: 40
			}
		);
		// 10 km: travel ceil(27.27) = 28, prep 35, total 63.
		assert_eq!(
			model.window_for(10.0),
			DeliveryWindow {
				min_minutes: 53,
				max_minutes: 78
			}
		);
		// 0 km keeps the lower bound floor.
		assert_eq!(model.window_for(0.0).min_minutes, 15);
	}

	#[test]
	fn test_window_bounds_ordered() {
		let model = FeeSettings::default().delivery_time;
		for tenth in 0..=300 {
			let window = model.window_for(f64::from(tenth) / 10.0);
			assert!(window.min_minutes <= window.max_minutes);
			assert!(window.min_minutes >= 15);
		}
	}

	#[test]
	fn test_window_saturates_on_extreme_inputs() {
		let model = DeliveryTimeModel {
			average_speed_kmh: 1e-9,
			base_preparation_minutes: u32::MAX,
			preparation_minutes_per_km: 1e6,
			lower_slack_minutes: 10,
			upper_slack_minutes: u32::MAX,
			minimum_lower_minutes: 15,
		};
		let window = model.window_for(1e12);
		assert_eq!(window.max_minutes, u32::MAX);
		assert_eq!(window.min_minutes, u32::MAX - 10);
		assert!(window.min_minutes <= window.max_minutes);

		let floor_above_total = DeliveryTimeModel {
			minimum_lower_minutes: 500,
			..FeeSettings::default().delivery_time
		};
		let window = floor_above_total.window_for(0.0);
		assert_eq!(window.min_minutes, 500);
		assert_eq!(window.max_minutes, 500);
	}

	#[test]
	fn test_clamp_total() {
		let settings = FeeSettings::default();
		assert_eq!(settings.clamp_total(dec!(0.50)), dec!(2.00));
		assert_eq!(settings.clamp_total(dec!(8.50)), dec!(8.50));
		assert_eq!(settings.clamp_total(dec!(40.00)), dec!(25.00));
	}
}

//! Time-of-day windows used by the peak-hour surcharge.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A half-open time-of-day window `[start, end)`, written as `"HH:MM-HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
	pub start: NaiveTime,
	pub end: NaiveTime,
}

impl TimeWindow {
	/// Builds a window from hour/minute pairs. Returns `None` for invalid times.
	pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
		Some(Self {
			start: NaiveTime::from_hms_opt(start.0, start.1, 0)?,
			end: NaiveTime::from_hms_opt(end.0, end.1, 0)?,
		})
	}

	/// Whether `time` falls inside the window.
	pub fn contains(&self, time: NaiveTime) -> bool {
		self.start <= time && time < self.end
	}
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
	NaiveTime::parse_from_str(value, "%H:%M")
		.or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
		.map_err(|e| format!("invalid time '{}': {}", value, e))
}

impl FromStr for TimeWindow {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (start, end) = s
			.split_once('-')
			.ok_or_else(|| format!("time window '{}' must look like HH:MM-HH:MM", s))?;
		let window = Self {
			start: parse_time(start.trim())?,
			end: parse_time(end.trim())?,
		};
		if window.start >= window.end {
			return Err(format!("time window '{}' must start before it ends", s));
		}
		Ok(window)
	}
}

impl TryFrom<String> for TimeWindow {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<TimeWindow> for String {
	fn from(window: TimeWindow) -> Self {
		window.to_string()
	}
}

impl fmt::Display for TimeWindow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_window() {
		let window: TimeWindow = "11:30-14:00".parse().unwrap();
		assert_eq!(window.to_string(), "11:30-14:00");
		assert!(window.contains(NaiveTime::from_hms_opt(11, 30, 0).unwrap()));
		assert!(window.contains(NaiveTime::from_hms_opt(13, 59, 59).unwrap()));
		assert!(!window.contains(NaiveTime::from_hms_opt(14, 0, 0).unwrap()));
		assert!(!window.contains(NaiveTime::from_hms_opt(11, 29, 0).unwrap()));
	}

	#[test]
	fn test_reject_inverted_window() {
		assert!("14:00-11:30".parse::<TimeWindow>().is_err());
		assert!("noon".parse::<TimeWindow>().is_err());
	}
}

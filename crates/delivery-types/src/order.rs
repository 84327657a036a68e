//! Order lifecycle statuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Status of an order in the delivery lifecycle.
///
/// The order orchestration layer owns an order's status; this type only
/// names the states so transitions can be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	/// Order placed, awaiting restaurant confirmation.
	Pending,
	/// Restaurant accepted the order.
	Confirmed,
	/// Kitchen is preparing the order.
	Preparing,
	/// Order is ready for pickup by the courier.
	Ready,
	/// Courier is on the way.
	OutForDelivery,
	/// Order handed to the customer.
	Delivered,
	/// Order was canceled.
	Canceled,
}

/// Error returned when a string does not name an order status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl OrderStatus {
	/// Every status, in lifecycle order.
	pub const ALL: [OrderStatus; 7] = [
		OrderStatus::Pending,
		OrderStatus::Confirmed,
		OrderStatus::Preparing,
		OrderStatus::Ready,
		OrderStatus::OutForDelivery,
		OrderStatus::Delivered,
		OrderStatus::Canceled,
	];

	/// Terminal statuses accept no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
	}

	/// Wire name of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "PENDING",
			OrderStatus::Confirmed => "CONFIRMED",
			OrderStatus::Preparing => "PREPARING",
			OrderStatus::Ready => "READY",
			OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
			OrderStatus::Delivered => "DELIVERED",
			OrderStatus::Canceled => "CANCELED",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ParseOrderStatusError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
		OrderStatus::ALL
			.into_iter()
			.find(|status| status.as_str() == normalized)
			.ok_or_else(|| ParseOrderStatusError(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_is_lenient() {
		assert_eq!("pending".parse(), Ok(OrderStatus::Pending));
		assert_eq!(
			"out-for-delivery".parse(),
			Ok(OrderStatus::OutForDelivery)
		);
		assert_eq!(" CANCELED ".parse(), Ok(OrderStatus::Canceled));
		assert!("shipped".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn test_display_round_trips_through_parse() {
		for status in OrderStatus::ALL {
			assert_eq!(status.to_string().parse(), Ok(status));
		}
	}

	#[test]
	fn test_terminal_statuses() {
		let terminal: Vec<_> = OrderStatus::ALL
			.into_iter()
			.filter(OrderStatus::is_terminal)
			.collect();
		assert_eq!(terminal, vec![OrderStatus::Delivered, OrderStatus::Canceled]);
	}

	#[test]
	fn test_serde_wire_names() {
		let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
		assert_eq!(json, "\"OUT_FOR_DELIVERY\"");
	}
}

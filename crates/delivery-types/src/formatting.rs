//! String formatting utilities.
//!
//! Provides display helpers for monetary amounts and distances in the
//! Brazilian convention (comma as decimal separator).

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount as Brazilian reais, e.g. `R$ 8,50`.
pub fn format_brl(amount: Decimal) -> String {
	let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
	format!("R$ {:.2}", rounded).replace('.', ",")
}

/// Formats a distance with one decimal place, e.g. `5,2 km`.
pub fn format_km(distance_km: f64) -> String {
	format!("{:.1} km", distance_km).replace('.', ",")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	#[test]
	fn test_format_brl() {
		assert_eq!(format_brl(dec!(8.5)), "R$ 8,50");
		assert_eq!(format_brl(dec!(25)), "R$ 25,00");
		assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
	}

	#[test]
	fn test_format_km() {
		assert_eq!(format_km(5.24), "5,2 km");
		assert_eq!(format_km(12.0), "12,0 km");
	}
}

//! Destination postal code (CEP) parsing.
//!
//! A destination code is an 8-digit Brazilian postal code, canonically written
//! as `NNNNN-NNN`. Raw input is normalized by stripping every non-digit before
//! validation, so `01310-100`, `01310100` and `01.310-100` are the same code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of digits in a normalized destination code.
pub const CODE_LENGTH: usize = 8;

/// Errors produced when a raw destination code cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationCodeError {
	/// The input contained no digits at all.
	#[error("destination code is empty")]
	Empty,
	/// The input did not normalize to exactly eight digits.
	#[error("destination code must have 8 digits, got {0}")]
	WrongLength(usize),
	/// Degenerate code made of one repeated digit (e.g. `00000000`).
	#[error("destination code cannot repeat a single digit")]
	RepeatedDigits,
}

/// A validated, normalized destination postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DestinationCode {
	digits: [u8; CODE_LENGTH],
}

impl DestinationCode {
	/// Parses and normalizes a raw postal code.
	pub fn parse(raw: &str) -> Result<Self, DestinationCodeError> {
		let digits: Vec<u8> = raw
			.chars()
			.filter_map(|c| c.to_digit(10))
			.map(|d| d as u8)
			.collect();

		if digits.is_empty() {
			return Err(DestinationCodeError::Empty);
		}
		let digits: [u8; CODE_LENGTH] = digits
			.as_slice()
			.try_into()
			.map_err(|_| DestinationCodeError::WrongLength(digits.len()))?;
		if digits.iter().all(|d| *d == digits[0]) {
			return Err(DestinationCodeError::RepeatedDigits);
		}

		Ok(Self { digits })
	}

	/// Renders the canonical `NNNNN-NNN` form of a raw code when it has eight
	/// digits, otherwise returns the input untouched.
	pub fn format_raw(raw: &str) -> String {
		let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
		if digits.len() == CODE_LENGTH {
			format!("{}-{}", &digits[..5], &digits[5..])
		} else {
			raw.to_string()
		}
	}

	/// The eight digits without separator.
	pub fn digits(&self) -> String {
		self.digits.iter().map(|d| char::from(b'0' + d)).collect()
	}

	/// First two digits, identifying the postal region.
	pub fn region_prefix(&self) -> u8 {
		self.digits[0] * 10 + self.digits[1]
	}

	/// Last three digits, identifying the neighborhood within a region.
	pub fn neighborhood_suffix(&self) -> u16 {
		self.digits[5..]
			.iter()
			.fold(0u16, |acc, d| acc * 10 + u16::from(*d))
	}

	/// Final digit of the code.
	pub fn last_digit(&self) -> u8 {
		self.digits[CODE_LENGTH - 1]
	}

	/// The code read as a number, e.g. `1310100` for `01310-100`.
	pub fn numeric_value(&self) -> u32 {
		self.digits
			.iter()
			.fold(0u32, |acc, d| acc * 10 + u32::from(*d))
	}
}

impl fmt::Display for DestinationCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let digits = self.digits();
		write!(f, "{}-{}", &digits[..5], &digits[5..])
	}
}

impl FromStr for DestinationCode {
	type Err = DestinationCodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for DestinationCode {
	type Error = DestinationCodeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<DestinationCode> for String {
	fn from(code: DestinationCode) -> Self {
		code.to_string()
	}
}

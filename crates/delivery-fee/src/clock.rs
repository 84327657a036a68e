//! Time sources for fee calculation.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Source of the current time.
///
/// `now` is the local wall-clock time used to decide peak hours; `now_utc` is
/// the instant stamped on each breakdown.
pub trait Clock: Send + Sync {
	fn now(&self) -> NaiveDateTime;

	fn now_utc(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time and local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> NaiveDateTime {
		Local::now().naive_local()
	}

	fn now_utc(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// Clock pinned to a single instant.
///
/// The wall time is interpreted as UTC for `now_utc`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
	at: NaiveDateTime,
}

impl FixedClock {
	pub fn new(at: NaiveDateTime) -> Self {
		Self { at }
	}
}

impl Clock for FixedClock {
	fn now(&self) -> NaiveDateTime {
		self.at
	}

	fn now_utc(&self) -> DateTime<Utc> {
		self.at.and_utc()
	}
}

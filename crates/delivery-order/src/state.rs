//! Order status state machine.
//!
//! Orders move forward one step at a time:
//! Pending -> Confirmed -> Preparing -> Ready -> OutForDelivery -> Delivered.
//! Until the order is ready it may instead be canceled. Delivered and Canceled
//! are terminal.

use delivery_types::OrderStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Reasons a proposed transition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderStatusError {
	#[error("No target status was provided")]
	MissingStatus,
	#[error("Order is already {0} and cannot change status")]
	Terminal(OrderStatus),
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
}

// Static transition table - each state maps to allowed next states
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([OrderStatus::Confirmed, OrderStatus::Canceled]),
	);
	m.insert(
		OrderStatus::Confirmed,
		HashSet::from([OrderStatus::Preparing, OrderStatus::Canceled]),
	);
	m.insert(
		OrderStatus::Preparing,
		HashSet::from([OrderStatus::Ready, OrderStatus::Canceled]),
	);
	m.insert(
		OrderStatus::Ready,
		HashSet::from([OrderStatus::OutForDelivery]),
	);
	m.insert(
		OrderStatus::OutForDelivery,
		HashSet::from([OrderStatus::Delivered]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m.insert(OrderStatus::Canceled, HashSet::new()); // terminal
	m
});

/// Evaluates order status transitions.
///
/// Holds no state; every check reads only its arguments and the static table.
pub struct OrderStatusMachine;

impl OrderStatusMachine {
	/// Checks if a state transition is valid.
	///
	/// A missing target, a self-transition or any edge not in the table is
	/// simply `false`.
	pub fn is_valid_transition(current: OrderStatus, proposed: Option<OrderStatus>) -> bool {
		proposed.is_some_and(|to| {
			TRANSITIONS
				.get(&current)
				.is_some_and(|set| set.contains(&to))
		})
	}

	/// Statuses reachable from `current` in one step, in lifecycle order.
	pub fn allowed_transitions(current: OrderStatus) -> Vec<OrderStatus> {
		OrderStatus::ALL
			.into_iter()
			.filter(|to| Self::is_valid_transition(current, Some(*to)))
			.collect()
	}

	/// Validates a transition and returns the new status, or the reason it is
	/// rejected.
	pub fn validate_transition(
		current: OrderStatus,
		proposed: Option<OrderStatus>,
	) -> Result<OrderStatus, OrderStatusError> {
		let to = proposed.ok_or(OrderStatusError::MissingStatus)?;
		if current.is_terminal() {
			tracing::debug!(from = %current, to = %to, "Rejected transition out of terminal status");
			return Err(OrderStatusError::Terminal(current));
		}
		if !Self::is_valid_transition(current, Some(to)) {
			tracing::debug!(from = %current, to = %to, "Rejected order status transition");
			return Err(OrderStatusError::InvalidTransition { from: current, to });
		}
		Ok(to)
	}

	/// Whether an order in `current` may still be canceled.
	pub fn can_cancel(current: OrderStatus) -> bool {
		Self::is_valid_transition(current, Some(OrderStatus::Canceled))
	}
}

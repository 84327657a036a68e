//! Order lifecycle rules for the delivery system.
//!
//! The orchestration layer owns an order and its persistence. This crate only
//! decides whether a proposed status change is legal, so the caller can apply
//! it or turn the rejection into a conflict response.

pub mod state;

pub use state::{OrderStatusError, OrderStatusMachine};

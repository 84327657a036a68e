//! Common types module for the delivery fee system.
//!
//! This module defines the core data types shared by the fee engine, the
//! order status machine, the restaurant catalog and the configuration layer.
//! Keeping them in one crate lets every component agree on the same
//! restaurant snapshot, postal code and fee breakdown representations.

/// Postal code parsing and normalization.
pub mod destination;
/// Fee breakdown and delivery window types produced by the fee engine.
pub mod fee;
/// Display helpers for money and distances.
pub mod formatting;
/// Order lifecycle statuses.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Restaurant snapshot consumed by the fee engine.
pub mod restaurant;
/// Configuration validation types for pluggable implementations.
pub mod validation;

// Re-export all types for convenient access
pub use destination::{DestinationCode, DestinationCodeError};
pub use fee::{DeliveryWindow, FeeBreakdown};
pub use formatting::{format_brl, format_km};
pub use order::{OrderStatus, ParseOrderStatusError};
pub use registry::ImplementationRegistry;
pub use restaurant::{Restaurant, RestaurantId};
pub use validation::*;

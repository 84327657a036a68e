//! Registry trait for self-registering implementations.
//!
//! Pluggable components (distance estimators, restaurant catalogs) provide a
//! `Registry` struct implementing this trait so the service can look them up
//! by the name used in configuration.

/// Base trait for implementation registries.
///
/// Every implementation module provides a Registry struct that declares its
/// configuration name and a factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example
	/// "simulated" for `distance.implementations.simulated`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}

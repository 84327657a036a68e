//! Builders for constructing configurations in tests and development.

pub mod config;

pub use config::ConfigBuilder;

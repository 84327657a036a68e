//! Command handlers for the delivery CLI.
//!
//! Handlers return JSON values so `main` only decides how to print them.

use delivery_catalog::{CatalogError, MemoryCatalog};
use delivery_config::Config;
use delivery_fee::{FeeCalculator, FeeError};
use delivery_order::OrderStatusMachine;
use delivery_types::{FeeBreakdown, OrderStatus, RestaurantId};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Wired fee engine and catalog.
pub struct Context {
	calculator: FeeCalculator,
	catalog: MemoryCatalog,
}

impl Context {
	pub fn new(calculator: FeeCalculator, catalog: MemoryCatalog) -> Self {
		Self {
			calculator,
			catalog,
		}
	}

	/// Builds the calculator and seeds the catalog from configuration.
	pub fn from_config(config: &Config) -> Result<Self, ContextError> {
		let calculator = FeeCalculator::from_config(config)?;
		let catalog = MemoryCatalog::from_config(&config.catalog)?;
		tracing::info!(
			restaurants = catalog.len(),
			estimator = config.distance.primary.as_str(),
			"Fee engine ready"
		);
		Ok(Self::new(calculator, catalog))
	}
}

/// Errors raised while wiring the fee engine.
#[derive(Debug, Error)]
pub enum ContextError {
	#[error(transparent)]
	Fee(#[from] FeeError),
	#[error(transparent)]
	Catalog(#[from] CatalogError),
}

/// A batch request the command refuses to run.
#[derive(Debug, Error)]
#[error("Invalid batch: {0}")]
pub struct InvalidBatch(String);

/// Which entries of a batch to print.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchView {
	pub sorted: bool,
	pub fast_only: bool,
}

/// Outcome of a transition check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDecision {
	pub from: OrderStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to: Option<OrderStatus>,
	pub allowed: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

pub fn fee(ctx: &Context, restaurant_id: RestaurantId, code: &str) -> Result<Value, FeeError> {
	let fee = ctx
		.calculator
		.calculate_fee_for(&ctx.catalog, restaurant_id, code)?;
	Ok(json!({
		"fee": fee,
		"formattedTotal": fee.formatted_total(),
	}))
}

pub fn batch(
	ctx: &Context,
	code: &str,
	restaurant_ids: &[RestaurantId],
	view: BatchView,
) -> Result<Value, InvalidBatch> {
	let max_batch_size = ctx.calculator.settings().max_batch_size;
	if restaurant_ids.is_empty() {
		return Err(InvalidBatch(
			"at least one restaurant id is required".to_string(),
		));
	}
	if restaurant_ids.len() > max_batch_size {
		return Err(InvalidBatch(format!(
			"at most {} restaurants per request, got {}",
			max_batch_size,
			restaurant_ids.len()
		)));
	}

	let fees = ctx
		.calculator
		.calculate_fees_for_multiple(&ctx.catalog, code, restaurant_ids);
	let summary = fees.summary();
	let threshold = ctx.calculator.settings().fast_delivery_minutes;

	let mut listed: Vec<&FeeBreakdown> = if view.sorted {
		fees.sorted_by_total()
	} else {
		fees.entries().values().collect()
	};
	if view.fast_only {
		listed.retain(|fee| fee.is_fast(threshold));
	}

	Ok(json!({
		"summary": summary,
		"description": summary.describe(),
		"fastDeliveries": fees.fast_deliveries(threshold).len(),
		"fees": listed,
	}))
}

pub fn transition(from: OrderStatus, to: Option<OrderStatus>) -> TransitionDecision {
	match OrderStatusMachine::validate_transition(from, to) {
		Ok(to) => TransitionDecision {
			from,
			to: Some(to),
			allowed: true,
			reason: None,
		},
		Err(e) => TransitionDecision {
			from,
			to,
			allowed: false,
			reason: Some(e.to_string()),
		},
	}
}

pub fn transitions(from: OrderStatus) -> Value {
	json!({
		"from": from,
		"terminal": from.is_terminal(),
		"canCancel": OrderStatusMachine::can_cancel(from),
		"allowed": OrderStatusMachine::allowed_transitions(from),
	})
}

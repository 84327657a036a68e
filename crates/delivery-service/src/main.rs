//! Main entry point for the delivery fee service.
//!
//! Loads the service configuration, wires the fee engine with the configured
//! distance estimator and restaurant catalog, and answers one query per
//! invocation. Results are printed as JSON.

use clap::{Parser, Subcommand};
use delivery_config::Config;
use delivery_types::{OrderStatus, RestaurantId};
use std::path::PathBuf;

mod commands;

use commands::{BatchView, Context};

/// Command-line arguments for the delivery service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/demo.toml", env = "DELIVERY_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Calculate the delivery fee for one restaurant
	Fee {
		/// Restaurant id
		#[arg(short, long)]
		restaurant: RestaurantId,
		/// Destination postal code, e.g. 01310-100
		#[arg(long)]
		code: String,
	},
	/// Compare delivery fees across restaurants for one destination
	Batch {
		/// Destination postal code
		#[arg(long)]
		code: String,
		/// Comma separated restaurant ids
		#[arg(short, long, value_delimiter = ',', required = true)]
		restaurants: Vec<RestaurantId>,
		/// Only list available restaurants, cheapest first
		#[arg(long)]
		sorted: bool,
		/// Only list fast deliveries
		#[arg(long)]
		fast_only: bool,
	},
	/// Check whether an order status change is allowed
	Transition {
		#[arg(long)]
		from: OrderStatus,
		#[arg(long)]
		to: Option<OrderStatus>,
	},
	/// List the statuses reachable from a status
	Transitions {
		#[arg(long)]
		from: OrderStatus,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let output = match args.command {
		Command::Fee { restaurant, code } => {
			let ctx = load_context(&args.config).await?;
			commands::fee(&ctx, restaurant, &code)?
		},
		Command::Batch {
			code,
			restaurants,
			sorted,
			fast_only,
		} => {
			let ctx = load_context(&args.config).await?;
			commands::batch(&ctx, &code, &restaurants, BatchView { sorted, fast_only })?
		},
		Command::Transition { from, to } => {
			let decision = commands::transition(from, to);
			println!("{}", serde_json::to_string_pretty(&decision)?);
			if !decision.allowed {
				std::process::exit(1);
			}
			return Ok(());
		},
		Command::Transitions { from } => commands::transitions(from),
	};

	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

async fn load_context(path: &std::path::Path) -> Result<Context, Box<dyn std::error::Error>> {
	let path = path.to_str().ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);
	Ok(Context::from_config(&config)?)
}

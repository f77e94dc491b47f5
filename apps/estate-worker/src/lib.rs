pub mod error;
pub mod worker;

pub use error::{Error, Result};

use clap::Parser;

use estate_service::EstateService;
use estate_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = estate_cli::VERSION,
	rename_all = "kebab",
	styles = estate_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: estate_cli::ConfigArgs,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = estate_config::load(&args.config.config)?;

	estate_cli::init_tracing(&config.service.log_level);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let state = worker::WorkerState::new(EstateService::new(config, db));

	tracing::info!(
		poll_interval_ms = state.poll_interval.whole_milliseconds(),
		max_attempts = state.max_attempts,
		"Note analysis worker started."
	);

	worker::run_worker(state).await
}

use clap::Parser;

use estate_worker::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	estate_worker::run(Args::parse()).await
}

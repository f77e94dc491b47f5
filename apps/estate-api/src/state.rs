use std::sync::Arc;

use estate_service::EstateService;
use estate_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<EstateService>,
}
impl AppState {
	pub async fn new(config: estate_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(EstateService::new(config, db)))
	}

	pub fn from_service(service: EstateService) -> Self {
		Self { service: Arc::new(service) }
	}
}

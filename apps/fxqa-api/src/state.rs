use std::sync::Arc;

use fxqa_service::FxService;
use fxqa_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FxService>,
}
impl AppState {
	pub async fn new(config: fxqa_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		Ok(Self::from_service(FxService::new(config, db)))
	}

	pub fn from_service(service: FxService) -> Self {
		Self { service: Arc::new(service) }
	}
}

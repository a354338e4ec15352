use std::sync::Arc;

use yojana_config::Config;
use yojana_service::{Providers, YojanaService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<YojanaService>,
	pub admin_auth_token: Option<String>,
}
impl AppState {
	/// Loads the scheme tables named in `config` and wires the HTTP providers.
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let service = YojanaService::open(config, Providers::default())?;

		tracing::info!(
			master = service.store().master().len(),
			details = service.store().details().len(),
			"Scheme tables loaded."
		);

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: YojanaService) -> Self {
		let admin_auth_token = service.cfg.security.admin_auth_token.clone();

		Self { service: Arc::new(service), admin_auth_token }
	}
}

pub mod eligibility;
pub mod matcher;
pub mod profile;
pub mod search;
pub mod web;

mod error;

pub use eligibility::{EligibilityOutcome, EligibleScheme, Selection, SelectionError};
pub use error::{Error, Result};
pub use matcher::MatchResult;
pub use profile::UserProfile;
pub use search::{Retrieval, RetrievalStage, SchemeRecord, SchemeSource};
pub use web::WebOutcome;

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, RwLock},
};

use serde::Serialize;
use serde_json::Value;

use yojana_config::{Config, LlmProviderConfig, WebSearchProviderConfig};
use yojana_providers::{WebResult, llm, web_search};
use yojana_storage::{JoinedScheme, SchemeStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait LlmProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, yojana_providers::Result<String>>;
}

pub trait WebSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a WebSearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, yojana_providers::Result<Vec<WebResult>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub llm: Arc<dyn LlmProvider>,
	pub web_search: Arc<dyn WebSearchProvider>,
}
impl Providers {
	pub fn new(llm: Arc<dyn LlmProvider>, web_search: Arc<dyn WebSearchProvider>) -> Self {
		Self { llm, web_search }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { llm: provider.clone(), web_search: provider }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
	pub master_count: usize,
	pub details_count: usize,
}

pub struct YojanaService {
	pub cfg: Config,
	pub providers: Providers,
	store: RwLock<Arc<SchemeStore>>,
}
impl YojanaService {
	pub fn new(cfg: Config, store: SchemeStore) -> Self {
		Self::with_providers(cfg, store, Providers::default())
	}

	pub fn with_providers(cfg: Config, store: SchemeStore, providers: Providers) -> Self {
		Self { cfg, providers, store: RwLock::new(Arc::new(store)) }
	}

	/// Loads both tables from the configured paths and builds the service around them.
	pub fn open(cfg: Config, providers: Providers) -> Result<Self> {
		let store = SchemeStore::load(&cfg.storage.master_path, &cfg.storage.details_path)?;

		Ok(Self::with_providers(cfg, store, providers))
	}

	/// The tables every operation in one request reads from. A reload swaps the handle and
	/// leaves snapshots taken earlier untouched.
	pub fn store(&self) -> Arc<SchemeStore> {
		self.store.read().unwrap_or_else(|err| err.into_inner()).clone()
	}

	/// Rereads both tables from disk. On failure the current tables stay in place.
	pub fn reload_store(&self) -> Result<ReloadReport> {
		let store =
			SchemeStore::load(&self.cfg.storage.master_path, &self.cfg.storage.details_path)?;
		let report =
			ReloadReport { master_count: store.master().len(), details_count: store.details().len() };

		*self.store.write().unwrap_or_else(|err| err.into_inner()) = Arc::new(store);

		tracing::info!(
			master = report.master_count,
			details = report.details_count,
			"Scheme tables reloaded."
		);

		Ok(report)
	}

	pub fn all_schemes(&self) -> Vec<JoinedScheme> {
		self.store().joined()
	}
}

struct DefaultProviders;
impl LlmProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, yojana_providers::Result<String>> {
		Box::pin(llm::complete(cfg, messages))
	}
}
impl WebSearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a WebSearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, yojana_providers::Result<Vec<WebResult>>> {
		Box::pin(web_search::search(cfg, query))
	}
}

/// First `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((idx, _)) => text[..idx].to_string(),
		None => text.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_on_char_boundaries() {
		assert_eq!(truncate_chars("योजना scheme", 5), "योजना");
		assert_eq!(truncate_chars("short", 800), "short");
		assert_eq!(truncate_chars("", 3), "");
	}
}

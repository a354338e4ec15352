use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub eligibility: Eligibility,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	/// JSON array of `{scheme_id, scheme_name}` rows.
	pub master_path: PathBuf,
	/// JSON array of per-scheme attribute rows keyed by `scheme_id`.
	pub details_path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
	pub web_search: WebSearchProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Either the key itself or `env:NAME` to read it from the environment at load time.
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct WebSearchProviderConfig {
	#[serde(default = "default_true")]
	pub enabled: bool,
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	/// Prepended to every query so results stay on government schemes.
	#[serde(default = "default_query_prefix")]
	pub query_prefix: String,
	#[serde(default = "default_max_results")]
	pub max_results: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub formatted_limit: u32,
	pub list_limit: u32,
	pub fallback_limit: u32,
	/// Query tokens with fewer characters than this are discarded.
	pub min_token_chars: u32,
	pub objective_max_chars: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			formatted_limit: 5,
			list_limit: 10,
			fallback_limit: 5,
			min_token_chars: 3,
			objective_max_chars: 800,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Eligibility {
	pub shortlist_max: u32,
	pub max_selected: u32,
}
impl Default for Eligibility {
	fn default() -> Self {
		Self { shortlist_max: 8, max_selected: 5 }
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub admin_auth_token: Option<String>,
}

fn default_true() -> bool {
	true
}

fn default_query_prefix() -> String {
	"Indian government schemes".to_string()
}

fn default_max_results() -> u32 {
	5
}

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Eligibility, LlmProviderConfig, Providers, Search, Security, Service, Storage,
	WebSearchProviderConfig,
};

use std::{env, fs, path::Path};

const ENV_PREFIX: &str = "env:";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg)?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("service.log_level", &cfg.service.log_level),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, path) in [
		("storage.master_path", &cfg.storage.master_path),
		("storage.details_path", &cfg.storage.details_path),
	] {
		if path.as_os_str().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	let llm = &cfg.providers.llm;

	for (label, value) in [
		("providers.llm.api_base", &llm.api_base),
		("providers.llm.path", &llm.path),
		("providers.llm.model", &llm.model),
		("providers.llm.api_key", &llm.api_key),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !llm.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	let web = &cfg.providers.web_search;

	if web.enabled {
		for (label, value) in [
			("providers.web_search.api_base", &web.api_base),
			("providers.web_search.path", &web.path),
			("providers.web_search.api_key", &web.api_key),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation {
					message: format!("{label} must be non-empty when web search is enabled."),
				});
			}
		}
	}
	if web.max_results == 0 || web.max_results > 20 {
		return Err(Error::Validation {
			message: "providers.web_search.max_results must be in the range 1-20.".to_string(),
		});
	}

	for (label, value) in [
		("search.formatted_limit", cfg.search.formatted_limit),
		("search.list_limit", cfg.search.list_limit),
		("search.fallback_limit", cfg.search.fallback_limit),
		("search.min_token_chars", cfg.search.min_token_chars),
		("search.objective_max_chars", cfg.search.objective_max_chars),
		("eligibility.shortlist_max", cfg.eligibility.shortlist_max),
		("eligibility.max_selected", cfg.eligibility.max_selected),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) -> Result<()> {
	if cfg.security.admin_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.admin_auth_token = None;
	}

	cfg.providers.llm.api_key =
		resolve_env_ref("providers.llm.api_key", &cfg.providers.llm.api_key)?;

	if cfg.providers.web_search.enabled {
		cfg.providers.web_search.api_key = resolve_env_ref(
			"providers.web_search.api_key",
			&cfg.providers.web_search.api_key,
		)?;
	}

	Ok(())
}

/// Expands `env:NAME` into the value of `NAME`; any other value is returned as-is.
pub fn resolve_env_ref(field: &str, value: &str) -> Result<String> {
	let Some(name) = value.trim().strip_prefix(ENV_PREFIX) else { return Ok(value.to_string()) };
	let name = name.trim();

	env::var(name)
		.map_err(|_| Error::MissingEnv { field: field.to_string(), name: name.to_string() })
}

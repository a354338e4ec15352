use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// One hit from the search endpoint, with absent fields left empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
	pub url: String,
	pub title: String,
	pub content: String,
}

pub async fn search(
	cfg: &yojana_config::WebSearchProviderConfig,
	query: &str,
) -> Result<Vec<WebResult>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({ "query": query, "max_results": cfg.max_results });
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(&json, cfg.max_results as usize)
}

fn parse_search_response(json: &Value, max_results: usize) -> Result<Vec<WebResult>> {
	let results = json.get("results").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing results array.".to_string() }
	})?;
	let field = |item: &Value, key: &str| {
		item.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
	};

	Ok(results
		.iter()
		.take(max_results)
		.map(|item| WebResult {
			url: field(item, "url"),
			title: field(item, "title"),
			content: field(item, "content"),
		})
		.collect())
}

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Sends one chat-completion request and returns the first choice's message content.
///
/// There is no retry: callers treat any error as "no answer".
pub async fn complete(
	cfg: &yojana_config::LlmProviderConfig,
	messages: &[Value],
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_content(&json)
}

fn parse_completion_content(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(|content| content.trim().to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices[0].message.content.".to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "  [{\"scheme_id\": 1}]\n" } },
				{ "message": { "content": "ignored" } }
			]
		});
		let content = parse_completion_content(&json).expect("parse failed");

		assert_eq!(content, "[{\"scheme_id\": 1}]");
	}

	#[test]
	fn rejects_missing_choices() {
		let json = serde_json::json!({ "error": { "message": "rate limited" } });

		assert!(matches!(parse_completion_content(&json), Err(Error::InvalidResponse { .. })));
	}
}

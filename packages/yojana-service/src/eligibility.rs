use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{YojanaService, truncate_chars};
use yojana_storage::{SchemeId, SchemeStore};

/// A scheme the model judged the user eligible for, joined back to the local tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleScheme {
	pub scheme_id: SchemeId,
	pub scheme_name: String,
	pub source_url: String,
	pub objective: String,
	pub eligibility_reason: String,
}

/// One element of the model's JSON answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
	pub scheme_id: Option<SchemeId>,
	pub eligibility_reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
	#[error("Model response contains no JSON array.")]
	MissingArray,
	#[error("Model response array is not valid JSON.")]
	Json(#[from] serde_json::Error),
	#[error("Model response JSON is not an array.")]
	NotArray,
	#[error("Model response element {index} is not an object.")]
	MalformedElement { index: usize },
}

/// How an eligibility check ended. Only [`EligibilityOutcome::Selected`] means the model
/// actually judged the candidates; the other variants mean eligibility is undetermined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EligibilityOutcome {
	Selected(Vec<EligibleScheme>),
	NoCandidates,
	Failed { reason: String },
}
impl EligibilityOutcome {
	pub fn into_schemes(self) -> Vec<EligibleScheme> {
		match self {
			Self::Selected(schemes) => schemes,
			Self::NoCandidates | Self::Failed { .. } => Vec::new(),
		}
	}
}

impl YojanaService {
	/// Schemes the user is likely eligible for. Empty means "could not determine", not
	/// "eligible for nothing".
	pub async fn get_eligible_schemes(&self, profile_text: &str) -> Vec<EligibleScheme> {
		self.assess_eligibility(profile_text).await.into_schemes()
	}

	pub async fn assess_eligibility(&self, profile_text: &str) -> EligibilityOutcome {
		let store = self.store();

		if store.details().is_empty() {
			return EligibilityOutcome::NoCandidates;
		}

		let shortlisted =
			shortlist(&store, profile_text, self.cfg.eligibility.shortlist_max as usize);

		if shortlisted.is_empty() {
			tracing::info!("No schemes matched the profile keywords. Skipping the model call.");

			return EligibilityOutcome::NoCandidates;
		}

		let lines = shortlisted
			.iter()
			.map(|scheme_id| {
				format!("{scheme_id}. {}", store.name_by_id(*scheme_id).unwrap_or("Unknown"))
			})
			.collect::<Vec<_>>();
		let messages =
			build_eligibility_messages(profile_text, &lines, self.cfg.eligibility.max_selected);
		let raw = match self.providers.llm.complete(&self.cfg.providers.llm, &messages).await {
			Ok(raw) => raw,
			Err(err) => {
				tracing::warn!(
					error = %err,
					candidates = shortlisted.len(),
					"Eligibility model call failed."
				);

				return EligibilityOutcome::Failed { reason: err.to_string() };
			},
		};
		let selections = match parse_selection(&raw) {
			Ok(selections) => selections,
			Err(err) => {
				tracing::warn!(
					error = %err,
					response = %truncate_chars(&raw, 200),
					"Eligibility response does not follow the JSON array contract."
				);

				return EligibilityOutcome::Failed { reason: err.to_string() };
			},
		};
		let selected_count = selections.len();
		let eligible =
			join_selections(&store, selections, self.cfg.search.objective_max_chars as usize);

		tracing::info!(
			candidates = shortlisted.len(),
			selected = selected_count,
			eligible = eligible.len(),
			"Eligibility check finished."
		);

		EligibilityOutcome::Selected(eligible)
	}
}

/// Lower-cased whitespace-separated words of the profile. No length filter.
pub fn profile_keywords(profile_text: &str) -> HashSet<String> {
	profile_text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Ids of details rows whose eligibility, objective, or tags contain any profile keyword, in
/// table order. Scanning stops once `max` ids are collected.
pub fn shortlist(store: &SchemeStore, profile_text: &str, max: usize) -> Vec<SchemeId> {
	let keywords = profile_keywords(profile_text);
	let mut out = Vec::new();

	if keywords.is_empty() || max == 0 {
		return out;
	}

	let mut seen = HashSet::new();

	for detail in store.details() {
		let text = format!(
			"{} {} {}",
			detail.eligibility.join(" "),
			detail.objective_text(),
			detail.tags.join(" ")
		)
		.to_lowercase();

		if keywords.iter().any(|keyword| text.contains(keyword.as_str()))
			&& seen.insert(detail.scheme_id)
		{
			out.push(detail.scheme_id);
		}
		if out.len() >= max {
			break;
		}
	}

	out
}

pub fn build_eligibility_messages(
	profile_text: &str,
	scheme_lines: &[String],
	max_selected: u32,
) -> Vec<Value> {
	let schema = serde_json::json!([
		{ "scheme_id": 1, "eligibility_reason": "short reason" }
	]);
	let schema_text = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| {
		"[{\"scheme_id\": 1, \"eligibility_reason\": \"short reason\"}]".to_string()
	});
	let system_prompt = "You are an Indian government scheme eligibility expert. \
Output must be valid JSON only and must match the provided schema exactly. \
Do not add explanations or extra fields.";
	let user_prompt = format!(
		"User information:\n{profile}\n\nBelow is a short list of schemes with IDs. \
Select ONLY those the user is clearly eligible for based on eligibility criteria.\n\n\
Schemes:\n{schemes}\n\nReturn JSON matching this exact schema:\n{schema}\n\nRules:\n\
- If eligibility is unclear, EXCLUDE the scheme\n- MAX_SCHEMES = {max}\n\
- Every element must include scheme_id",
		profile = profile_text,
		schemes = scheme_lines.join("\n"),
		schema = schema_text,
		max = max_selected,
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// Parses the text between the first `[` and the last `]` of `raw` as a JSON array of
/// selections. Elements without an integer `scheme_id` keep `None` and are dropped at join time.
pub fn parse_selection(raw: &str) -> Result<Vec<Selection>, SelectionError> {
	let start = raw.find('[').ok_or(SelectionError::MissingArray)?;
	let end = raw.rfind(']').filter(|end| *end > start).ok_or(SelectionError::MissingArray)?;
	let value: Value = serde_json::from_str(&raw[start..=end])?;
	let Value::Array(items) = value else { return Err(SelectionError::NotArray) };
	let mut out = Vec::with_capacity(items.len());

	for (index, item) in items.iter().enumerate() {
		let Some(object) = item.as_object() else {
			return Err(SelectionError::MalformedElement { index });
		};

		out.push(Selection {
			scheme_id: object.get("scheme_id").and_then(Value::as_i64),
			eligibility_reason: object
				.get("eligibility_reason")
				.and_then(Value::as_str)
				.unwrap_or_default()
				.to_string(),
		});
	}

	Ok(out)
}

/// Joins selections against the master (name) and details (url, objective) tables, in model
/// order. Selections naming an unknown id are dropped.
pub fn join_selections(
	store: &SchemeStore,
	selections: Vec<Selection>,
	objective_max_chars: usize,
) -> Vec<EligibleScheme> {
	selections
		.into_iter()
		.filter_map(|selection| {
			let scheme_id = selection.scheme_id?;
			let scheme_name = store.name_by_id(scheme_id)?;
			let detail = store.detail_by_id(scheme_id)?;

			Some(EligibleScheme {
				scheme_id,
				scheme_name: scheme_name.to_string(),
				source_url: detail.source_url.clone().unwrap_or_default(),
				objective: truncate_chars(detail.objective_text(), objective_max_chars),
				eligibility_reason: selection.eligibility_reason,
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_array_from_surrounding_prose() {
		let raw =
			"Here you go:\n```json\n[{\"scheme_id\": 3, \"eligibility_reason\": \"widow\"}]\n```";
		let parsed = parse_selection(raw).expect("parse failed");

		assert_eq!(
			parsed,
			vec![Selection { scheme_id: Some(3), eligibility_reason: "widow".to_string() }]
		);
	}

	#[test]
	fn missing_closing_bracket_is_rejected() {
		let raw = "[{\"scheme_id\": 1, \"eligibility_reason\": \"farmer\"}";

		assert!(matches!(parse_selection(raw), Err(SelectionError::MissingArray)));
	}

	#[test]
	fn closing_bracket_before_opening_is_rejected() {
		assert!(matches!(parse_selection("] nothing ["), Err(SelectionError::MissingArray)));
	}

	#[test]
	fn invalid_json_is_rejected() {
		assert!(matches!(parse_selection("[{scheme_id: 1}]"), Err(SelectionError::Json(_))));
	}

	#[test]
	fn non_object_element_is_rejected() {
		assert!(matches!(
			parse_selection("[1, 2]"),
			Err(SelectionError::MalformedElement { index: 0 })
		));
	}

	#[test]
	fn missing_fields_are_tolerated() {
		let parsed = parse_selection("[{\"eligibility_reason\": \"x\"}, {\"scheme_id\": 2}]")
			.expect("parse failed");

		assert_eq!(parsed[0].scheme_id, None);
		assert_eq!(parsed[1].eligibility_reason, "");
	}

	#[test]
	fn keywords_are_lowercased_words() {
		let keywords = profile_keywords("I am a Farmer\nin  Delhi");

		for word in ["i", "am", "a", "farmer", "in", "delhi"] {
			assert!(keywords.contains(word), "missing {word}");
		}
		assert_eq!(keywords.len(), 6);
	}

	#[test]
	fn prompt_lists_schemes_and_limit() {
		let messages = build_eligibility_messages(
			"age: 30",
			&["1. Farmer Aid".to_string(), "2. Pension".to_string()],
			5,
		);
		let user = messages[1]["content"].as_str().expect("user prompt");

		assert_eq!(messages[0]["role"], "system");
		assert!(user.contains("age: 30"));
		assert!(user.contains("1. Farmer Aid\n2. Pension"));
		assert!(user.contains("MAX_SCHEMES = 5"));
		assert!(user.contains("\"scheme_id\": 1"));
	}
}

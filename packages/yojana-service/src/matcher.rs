use std::collections::HashSet;

use yojana_storage::{SchemeDetail, SchemeId, SchemeStore};

/// Matched scheme ids: every query token found (`exact`) ahead of some tokens found
/// (`partial`). Both keep master table order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
	pub exact: Vec<SchemeId>,
	pub partial: Vec<SchemeId>,
}
impl MatchResult {
	pub fn ids(&self) -> impl Iterator<Item = SchemeId> + '_ {
		self.exact.iter().chain(self.partial.iter()).copied()
	}

	pub fn len(&self) -> usize {
		self.exact.len() + self.partial.len()
	}

	pub fn is_empty(&self) -> bool {
		self.exact.is_empty() && self.partial.is_empty()
	}
}

/// Lower-cases `query`, splits on whitespace and `/`, and drops tokens shorter than
/// `min_chars` characters.
pub fn tokenize_query(query: &str, min_chars: usize) -> Vec<String> {
	query
		.to_lowercase()
		.split(|ch: char| ch.is_whitespace() || ch == '/')
		.filter(|token| !token.is_empty() && token.chars().count() >= min_chars)
		.map(str::to_string)
		.collect()
}

/// Lower-cased text a query token is searched in.
pub fn searchable_text(name: &str, detail: Option<&SchemeDetail>) -> String {
	let Some(detail) = detail else { return name.to_lowercase() };

	[
		name,
		detail.objective_text(),
		&detail.eligibility.join(" "),
		&detail.benefits.join(" "),
		&detail.documents_required.join(" "),
		&detail.tags.join(" "),
	]
	.join(" ")
	.to_lowercase()
}

/// Substring match of query tokens against each scheme's searchable text.
///
/// Tokens match anywhere, without word boundaries, so `pan` matches `company`. A query with no
/// usable tokens matches nothing.
pub fn match_by_text(store: &SchemeStore, query: &str, min_chars: usize) -> MatchResult {
	let tokens = tokenize_query(query, min_chars);
	let mut result = MatchResult::default();

	if tokens.is_empty() {
		tracing::debug!(query, "Query has no searchable tokens.");

		return result;
	}

	let mut seen = HashSet::new();

	for entry in store.master() {
		if !seen.insert(entry.scheme_id) {
			continue;
		}

		let text = searchable_text(&entry.scheme_name, store.detail_by_id(entry.scheme_id));
		let matched = tokens.iter().filter(|token| text.contains(token.as_str())).count();

		if matched == tokens.len() {
			result.exact.push(entry.scheme_id);
		} else if matched > 0 {
			result.partial.push(entry.scheme_id);
		}
	}

	tracing::debug!(
		query,
		tokens = ?tokens,
		exact = result.exact.len(),
		partial = result.partial.len(),
		"Matched schemes by text."
	);

	result
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_slash_and_drops_short_tokens() {
		assert_eq!(tokenize_query("SC/ST  of a Farmer", 3), vec!["farmer".to_string()]);
		assert_eq!(tokenize_query("women/girls education", 3), vec!["women", "girls", "education"]);
	}

	#[test]
	fn short_only_query_has_no_tokens() {
		assert!(tokenize_query("an at / is", 3).is_empty());
		assert!(tokenize_query("   ", 3).is_empty());
	}

	#[test]
	fn searchable_text_covers_every_field() {
		let detail = SchemeDetail {
			scheme_id: 1,
			objective: Some("Support Farmers".to_string()),
			tags: vec!["Agriculture".to_string()],
			benefits: vec!["Cash Grant".to_string()],
			eligibility: vec!["Small Landholder".to_string()],
			documents_required: vec!["Aadhaar Card".to_string()],
			..Default::default()
		};
		let text = searchable_text("Kisan Aid", Some(&detail));

		for needle in
			["kisan aid", "support farmers", "agriculture", "cash grant", "landholder", "aadhaar"]
		{
			assert!(text.contains(needle), "missing {needle} in {text}");
		}
	}
}

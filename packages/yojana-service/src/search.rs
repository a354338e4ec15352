use serde::{Deserialize, Serialize};

use crate::{WebOutcome, YojanaService, matcher, truncate_chars};
use yojana_providers::WebResult;
use yojana_storage::{SchemeDetail, SchemeId, SchemeStore};

const UNKNOWN_LOCAL_NAME: &str = "Unknown Scheme";
const UNKNOWN_NAME: &str = "Unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeSource {
	Local,
	Web,
}
impl SchemeSource {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Local => "local",
			Self::Web => "web",
		}
	}
}

/// Which step of the fallback chain produced a [`Retrieval`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStage {
	/// Text match against the local tables.
	Local,
	/// Live web search.
	Web,
	/// Leading rows of the details table, unrelated to the query.
	Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeRecord {
	pub scheme_id: Option<SchemeId>,
	pub scheme_name: Option<String>,
	pub state: Option<String>,
	pub objective: String,
	pub tags: Vec<String>,
	pub benefits: Vec<String>,
	pub eligibility: Vec<String>,
	pub documents_required: Vec<String>,
	pub source_url: Option<String>,
	pub source: SchemeSource,
}
impl SchemeRecord {
	pub fn from_detail(detail: &SchemeDetail, scheme_name: Option<String>) -> Self {
		Self {
			scheme_id: Some(detail.scheme_id),
			scheme_name,
			state: detail.state.clone(),
			objective: detail.objective_text().to_string(),
			tags: detail.tags.clone(),
			benefits: detail.benefits.clone(),
			eligibility: detail.eligibility.clone(),
			documents_required: detail.documents_required.clone(),
			source_url: detail.source_url.clone(),
			source: SchemeSource::Local,
		}
	}

	/// `position` is 1-based and names untitled results.
	pub fn from_web(result: WebResult, position: usize) -> Self {
		let scheme_name =
			if result.title.trim().is_empty() { format!("Scheme {position}") } else { result.title };

		Self {
			scheme_id: None,
			scheme_name: Some(scheme_name),
			state: None,
			objective: result.content,
			tags: Vec::new(),
			benefits: Vec::new(),
			eligibility: Vec::new(),
			documents_required: Vec::new(),
			source_url: Some(result.url).filter(|url| !url.is_empty()),
			source: SchemeSource::Web,
		}
	}

	/// The scheme name, else the last path segment of the source URL, else `Unknown`.
	pub fn display_name(&self) -> &str {
		if let Some(name) = self.scheme_name.as_deref().filter(|name| !name.is_empty()) {
			return name;
		}

		self.source_url
			.as_deref()
			.and_then(|url| url.trim_end_matches('/').rsplit('/').next())
			.filter(|segment| !segment.is_empty())
			.unwrap_or(UNKNOWN_NAME)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Retrieval {
	pub stage: RetrievalStage,
	pub records: Vec<SchemeRecord>,
}

impl YojanaService {
	/// Runs the fallback chain: local text match, then web search, then the first rows of the
	/// details table. `limit` caps the local stage only.
	pub async fn retrieve(&self, query: &str, limit: usize) -> Retrieval {
		let store = self.store();
		let local = local_records(&store, query, self.cfg.search.min_token_chars as usize, limit);

		if !local.is_empty() {
			tracing::info!(query, count = local.len(), "Returning local schemes.");

			return Retrieval { stage: RetrievalStage::Local, records: local };
		}

		tracing::info!(query, "No local schemes matched. Searching the web.");

		let web = self.search_web(query).await.into_records();

		if !web.is_empty() {
			return Retrieval { stage: RetrievalStage::Web, records: web };
		}

		let fallback = fallback_records(&store, self.cfg.search.fallback_limit as usize);

		tracing::warn!(
			query,
			count = fallback.len(),
			"Web search returned nothing. Returning leading schemes regardless of the query."
		);

		Retrieval { stage: RetrievalStage::Fallback, records: fallback }
	}

	/// Text rendering of up to `search.formatted_limit` local schemes, for prompt injection.
	pub async fn search_formatted(&self, query: &str) -> String {
		let retrieval = self.retrieve(query, self.cfg.search.formatted_limit as usize).await;

		format_records(&retrieval.records, self.cfg.search.objective_max_chars as usize)
	}

	/// Up to `search.list_limit` local schemes, for display.
	pub async fn search_list(&self, query: &str) -> Vec<SchemeRecord> {
		self.retrieve(query, self.cfg.search.list_limit as usize).await.records
	}
}

pub fn local_records(
	store: &SchemeStore,
	query: &str,
	min_token_chars: usize,
	limit: usize,
) -> Vec<SchemeRecord> {
	let matches = matcher::match_by_text(store, query, min_token_chars);

	matches
		.ids()
		.take(limit)
		.filter_map(|scheme_id| {
			let detail = store.detail_by_id(scheme_id)?;
			let name = store.name_by_id(scheme_id).unwrap_or(UNKNOWN_LOCAL_NAME);

			Some(SchemeRecord::from_detail(detail, Some(name.to_string())))
		})
		.collect()
}

pub fn fallback_records(store: &SchemeStore, limit: usize) -> Vec<SchemeRecord> {
	store
		.details()
		.iter()
		.take(limit)
		.map(|detail| {
			let name = store.name_by_id(detail.scheme_id).map(str::to_string);

			SchemeRecord::from_detail(detail, name)
		})
		.collect()
}

/// `Scheme {i}: {name} [{source}]` followed by the truncated objective, one block per record,
/// blocks separated by a blank line.
pub fn format_records(records: &[SchemeRecord], objective_max_chars: usize) -> String {
	records
		.iter()
		.enumerate()
		.map(|(idx, record)| {
			format!(
				"Scheme {}: {} [{}]\n{}",
				idx + 1,
				record.display_name(),
				record.source.as_str(),
				truncate_chars(&record.objective, objective_max_chars)
			)
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}

use crate::{SchemeRecord, YojanaService};

/// Result of one web search attempt. Failures are kept apart from empty answers for logging,
/// but callers normally collapse both to an empty list with [`WebOutcome::into_records`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebOutcome {
	Found(Vec<SchemeRecord>),
	NoResults,
	Failed { message: String },
}
impl WebOutcome {
	pub fn into_records(self) -> Vec<SchemeRecord> {
		match self {
			Self::Found(records) => records,
			Self::NoResults | Self::Failed { .. } => Vec::new(),
		}
	}
}

impl YojanaService {
	/// One call to the web search provider. Never fails; errors come back as
	/// [`WebOutcome::Failed`].
	pub async fn search_web(&self, query: &str) -> WebOutcome {
		let cfg = &self.cfg.providers.web_search;

		if !cfg.enabled {
			tracing::debug!(query, "Web search is disabled.");

			return WebOutcome::NoResults;
		}

		let search_query = build_web_query(&cfg.query_prefix, query);
		let results = match self.providers.web_search.search(cfg, &search_query).await {
			Ok(results) => results,
			Err(err) => {
				tracing::warn!(error = %err, query = %search_query, "Web search failed.");

				return WebOutcome::Failed { message: err.to_string() };
			},
		};
		let records = results
			.into_iter()
			.take(cfg.max_results as usize)
			.enumerate()
			.map(|(idx, result)| SchemeRecord::from_web(result, idx + 1))
			.collect::<Vec<_>>();

		tracing::info!(query = %search_query, count = records.len(), "Web search finished.");

		if records.is_empty() { WebOutcome::NoResults } else { WebOutcome::Found(records) }
	}
}

pub fn build_web_query(prefix: &str, query: &str) -> String {
	let prefix = prefix.trim();
	let query = query.trim();

	if prefix.is_empty() {
		return query.to_string();
	}

	format!("{prefix} {query}")
}

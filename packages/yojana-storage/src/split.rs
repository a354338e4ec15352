//! Offline denormalization of a flat scheme collection into the master and details tables.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, SchemeDetail, SchemeId, SchemeMaster};

/// A scheme as scraped, before it is split into the two tables.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FlatScheme {
	#[serde(default)]
	pub scheme_id: Option<SchemeId>,
	#[serde(default)]
	pub scheme_name: Option<String>,
	#[serde(default)]
	pub state: Option<String>,
	#[serde(default)]
	pub objective: Option<String>,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
	#[serde(default)]
	pub benefits: Option<Vec<String>>,
	#[serde(default)]
	pub eligibility: Option<Vec<String>>,
	#[serde(default)]
	pub documents_required: Option<Vec<String>>,
	#[serde(default)]
	pub source_url: Option<String>,
}

/// Splits records into master and details rows. Records without a `scheme_id` take their
/// 1-based position in `records`.
pub fn split_flat(records: Vec<FlatScheme>) -> (Vec<SchemeMaster>, Vec<SchemeDetail>) {
	let mut master = Vec::with_capacity(records.len());
	let mut details = Vec::with_capacity(records.len());

	for (idx, record) in records.into_iter().enumerate() {
		let scheme_id = record.scheme_id.unwrap_or(idx as SchemeId + 1);

		master.push(SchemeMaster { scheme_id, scheme_name: record.scheme_name.unwrap_or_default() });
		details.push(SchemeDetail {
			scheme_id,
			state: record.state,
			objective: record.objective,
			tags: record.tags.unwrap_or_default(),
			benefits: record.benefits.unwrap_or_default(),
			eligibility: record.eligibility.unwrap_or_default(),
			documents_required: record.documents_required.unwrap_or_default(),
			source_url: record.source_url,
		});
	}

	(master, details)
}

pub fn read_flat(path: &Path) -> Result<Vec<FlatScheme>> {
	let raw = fs::read_to_string(path)
		.map_err(|source| Error::Read { path: path.to_path_buf(), source })?;

	serde_json::from_str(&raw).map_err(|source| Error::Parse { path: path.to_path_buf(), source })
}

pub fn write_tables(
	master: &[SchemeMaster],
	details: &[SchemeDetail],
	master_path: &Path,
	details_path: &Path,
) -> Result<()> {
	write_table(master, master_path)?;
	write_table(details, details_path)?;

	tracing::info!(
		master = master.len(),
		details = details.len(),
		master_path = %master_path.display(),
		details_path = %details_path.display(),
		"Wrote scheme tables."
	);

	Ok(())
}

fn write_table<T>(rows: &[T], path: &Path) -> Result<()>
where
	T: Serialize,
{
	let payload = serde_json::to_string_pretty(rows)
		.map_err(|source| Error::Encode { path: path.to_path_buf(), source })?;

	fs::write(path, payload).map_err(|source| Error::Write { path: path.to_path_buf(), source })
}

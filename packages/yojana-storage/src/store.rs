use std::{collections::HashMap, fs, path::Path};

use serde::de::DeserializeOwned;

use crate::{Error, JoinedScheme, Result, SchemeDetail, SchemeId, SchemeMaster};

/// Read-only view over the master and details tables.
///
/// Both tables are read once when the store is built and never mutated afterwards. Id lookups
/// go through maps built at construction; when an id repeats, the first row wins, which is what
/// a front-to-back scan of the table would return.
#[derive(Debug, Default)]
pub struct SchemeStore {
	master: Vec<SchemeMaster>,
	details: Vec<SchemeDetail>,
	detail_index: HashMap<SchemeId, usize>,
	names: HashMap<SchemeId, usize>,
}
impl SchemeStore {
	pub fn load(master_path: &Path, details_path: &Path) -> Result<Self> {
		let master: Vec<SchemeMaster> = read_table(master_path)?;
		let details: Vec<SchemeDetail> = read_table(details_path)?;
		let store = Self::from_tables(master, details);

		tracing::info!(
			master = store.master.len(),
			details = store.details.len(),
			master_path = %master_path.display(),
			details_path = %details_path.display(),
			"Loaded scheme tables."
		);

		Ok(store)
	}

	pub fn from_tables(master: Vec<SchemeMaster>, details: Vec<SchemeDetail>) -> Self {
		let mut detail_index = HashMap::with_capacity(details.len());

		for (idx, detail) in details.iter().enumerate() {
			detail_index.entry(detail.scheme_id).or_insert(idx);
		}

		let mut names = HashMap::with_capacity(master.len());

		for (idx, entry) in master.iter().enumerate() {
			if entry.scheme_name.is_empty() {
				continue;
			}

			names.entry(entry.scheme_id).or_insert(idx);
		}

		Self { master, details, detail_index, names }
	}

	pub fn master(&self) -> &[SchemeMaster] {
		&self.master
	}

	pub fn details(&self) -> &[SchemeDetail] {
		&self.details
	}

	pub fn detail_by_id(&self, scheme_id: SchemeId) -> Option<&SchemeDetail> {
		self.detail_index.get(&scheme_id).map(|idx| &self.details[*idx])
	}

	/// Name from the master table. Empty names count as absent.
	pub fn name_by_id(&self, scheme_id: SchemeId) -> Option<&str> {
		self.names.get(&scheme_id).map(|idx| self.master[*idx].scheme_name.as_str())
	}

	/// Inner join of master and details in master order. Master rows without details are skipped,
	/// as are details without a master row.
	pub fn joined(&self) -> Vec<JoinedScheme> {
		self.master
			.iter()
			.filter_map(|entry| {
				self.detail_by_id(entry.scheme_id).map(|detail| JoinedScheme {
					scheme_name: entry.scheme_name.clone(),
					detail: detail.clone(),
				})
			})
			.collect()
	}
}

fn read_table<T>(path: &Path) -> Result<Vec<T>>
where
	T: DeserializeOwned,
{
	let raw = fs::read_to_string(path)
		.map_err(|source| Error::Read { path: path.to_path_buf(), source })?;

	serde_json::from_str(&raw).map_err(|source| Error::Parse { path: path.to_path_buf(), source })
}

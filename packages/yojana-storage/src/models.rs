use serde::{Deserialize, Deserializer, Serialize};

pub type SchemeId = i64;

/// One row of the master table: the id and display name of a scheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeMaster {
	pub scheme_id: SchemeId,
	#[serde(default, deserialize_with = "null_as_default")]
	pub scheme_name: String,
}

/// One row of the details table. `scheme_id` references [`SchemeMaster::scheme_id`], but the
/// reference is not checked when the tables are loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDetail {
	pub scheme_id: SchemeId,
	#[serde(default)]
	pub state: Option<String>,
	#[serde(default)]
	pub objective: Option<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub tags: Vec<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub benefits: Vec<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub eligibility: Vec<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub documents_required: Vec<String>,
	#[serde(default)]
	pub source_url: Option<String>,
}
impl SchemeDetail {
	pub fn objective_text(&self) -> &str {
		self.objective.as_deref().unwrap_or_default()
	}
}

/// A master row joined with its details row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JoinedScheme {
	pub scheme_name: String,
	#[serde(flatten)]
	pub detail: SchemeDetail,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

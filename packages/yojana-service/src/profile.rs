use serde::{Deserialize, Serialize};

const SUMMARY_MESSAGE_LIMIT: usize = 5;

/// Attributes collected about a user over a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
	pub age: Option<u32>,
	pub income: Option<String>,
	pub state: Option<String>,
	pub occupation: Option<String>,
	pub education: Option<String>,
	pub gender: Option<String>,
	pub caste: Option<String>,
	pub disability: Option<String>,
	pub employment_status: Option<String>,
	pub business_type: Option<String>,
	pub family_income: Option<String>,
	pub has_land: Option<bool>,
	pub language: String,
	/// Raw user messages, oldest first.
	pub messages: Vec<String>,
}
impl UserProfile {
	pub fn add_message(&mut self, text: impl Into<String>) {
		self.messages.push(text.into());
	}

	/// True when no attribute is set and no message was recorded. `language` is ignored since it
	/// always has a value.
	pub fn is_empty(&self) -> bool {
		self.attributes().iter().all(|(_, value)| value.is_none()) && self.messages.is_empty()
	}

	/// `key: value` lines for the set attributes, then the first few raw messages. This is the
	/// text handed to the eligibility check.
	pub fn summary(&self) -> String {
		let mut lines = self
			.attributes()
			.into_iter()
			.filter_map(|(key, value)| value.map(|value| format!("{key}: {value}")))
			.collect::<Vec<_>>();

		if !self.language.trim().is_empty() {
			lines.push(format!("language: {}", self.language));
		}
		if !self.messages.is_empty() {
			let recent = self.messages.iter().take(SUMMARY_MESSAGE_LIMIT).map(String::as_str);

			lines.push(format!("\nUser messages: {}", recent.collect::<Vec<_>>().join(" | ")));
		}

		lines.join("\n")
	}

	fn attributes(&self) -> [(&'static str, Option<String>); 12] {
		let text = |value: &Option<String>| value.clone().filter(|value| !value.trim().is_empty());

		[
			("age", self.age.map(|age| age.to_string())),
			("income", text(&self.income)),
			("state", text(&self.state)),
			("occupation", text(&self.occupation)),
			("education", text(&self.education)),
			("gender", text(&self.gender)),
			("caste", text(&self.caste)),
			("disability", text(&self.disability)),
			("employment_status", text(&self.employment_status)),
			("business_type", text(&self.business_type)),
			("family_income", text(&self.family_income)),
			(
				"has_land",
				self.has_land.map(|has_land| if has_land { "yes" } else { "no" }).map(str::to_string),
			),
		]
	}
}
impl Default for UserProfile {
	fn default() -> Self {
		Self {
			age: None,
			income: None,
			state: None,
			occupation: None,
			education: None,
			gender: None,
			caste: None,
			disability: None,
			employment_status: None,
			business_type: None,
			family_income: None,
			has_land: None,
			language: "English".to_string(),
			messages: Vec::new(),
		}
	}
}

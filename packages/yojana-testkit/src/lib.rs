mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::{
		Arc, Mutex,
		atomic::{AtomicU64, AtomicUsize, Ordering},
	},
	time::{SystemTime, UNIX_EPOCH},
};

use serde_json::{Map, Value};

use yojana_config::{
	Config, Eligibility, LlmProviderConfig, Providers as ProviderConfigs, Search, Security,
	Service, Storage, WebSearchProviderConfig,
};
use yojana_providers::WebResult;
use yojana_service::{BoxFuture, LlmProvider, Providers, WebSearchProvider, YojanaService};
use yojana_storage::{SchemeDetail, SchemeId, SchemeMaster, SchemeStore};

pub fn master(scheme_id: SchemeId, scheme_name: &str) -> SchemeMaster {
	SchemeMaster { scheme_id, scheme_name: scheme_name.to_string() }
}

pub fn detail(scheme_id: SchemeId) -> SchemeDetail {
	SchemeDetail { scheme_id, ..Default::default() }
}

fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

/// One scheme, "Farmer Aid", with id 1.
pub fn farmer_aid_tables() -> (Vec<SchemeMaster>, Vec<SchemeDetail>) {
	let master = vec![master(1, "Farmer Aid")];
	let details = vec![SchemeDetail {
		objective: Some("helps farmers".to_string()),
		eligibility: strings(&["farmer"]),
		..detail(1)
	}];

	(master, details)
}

/// Five joined schemes plus a master row without details (id 6) and a details row without a
/// master row (id 99).
pub fn sample_tables() -> (Vec<SchemeMaster>, Vec<SchemeDetail>) {
	let master = vec![
		master(1, "PM Kisan Samman Nidhi"),
		master(2, "Lakshya Scheme"),
		master(3, "Udyogini"),
		master(4, "Post Matric Scholarship for SC Students"),
		master(5, "Indira Gandhi National Widow Pension"),
		master(6, "Unlisted Housing Grant"),
	];
	let details = vec![
		SchemeDetail {
			state: Some("Central".to_string()),
			objective: Some("Income support to landholding farmer families.".to_string()),
			tags: strings(&["Agriculture", "Farmer"]),
			benefits: strings(&["Rs 6000 per year in three instalments"]),
			eligibility: strings(&["Landholding farmer families"]),
			documents_required: strings(&["Aadhaar Card", "Land records"]),
			source_url: Some("https://www.myscheme.gov.in/schemes/pm-kisan".to_string()),
			..detail(1)
		},
		SchemeDetail {
			state: Some("Goa".to_string()),
			objective: Some("Training support for elite sportspersons.".to_string()),
			tags: strings(&["Sports"]),
			benefits: strings(&["Coaching and equipment grant"]),
			eligibility: strings(&["Resident athletes of Goa"]),
			documents_required: strings(&["Residence certificate"]),
			source_url: Some("https://www.myscheme.gov.in/schemes/lakshya".to_string()),
			..detail(2)
		},
		SchemeDetail {
			state: Some("Karnataka".to_string()),
			objective: Some("Loans for women entrepreneurs running small businesses.".to_string()),
			tags: strings(&["Women", "Business"]),
			benefits: strings(&["Interest free loan up to Rs 3 lakh"]),
			eligibility: strings(&["Women aged 18 to 55", "Family income below Rs 1.5 lakh"]),
			documents_required: strings(&["Income certificate"]),
			source_url: Some("https://www.myscheme.gov.in/schemes/udyogini".to_string()),
			..detail(3)
		},
		SchemeDetail {
			state: None,
			objective: Some("Scholarship for students studying after matriculation.".to_string()),
			tags: strings(&["Education", "Scholarship"]),
			benefits: strings(&["Tuition fee reimbursement"]),
			eligibility: strings(&["Students belonging to Scheduled Castes"]),
			documents_required: strings(&["Caste certificate", "Marksheet"]),
			source_url: Some("https://www.myscheme.gov.in/schemes/pms-sc".to_string()),
			..detail(4)
		},
		SchemeDetail {
			state: None,
			objective: Some("Monthly pension for widows.".to_string()),
			tags: strings(&["Pension", "Women"]),
			benefits: strings(&["Rs 300 per month"]),
			eligibility: strings(&["Widow aged 40 to 79", "Below poverty line household"]),
			documents_required: strings(&["Death certificate of spouse"]),
			source_url: Some("https://www.myscheme.gov.in/schemes/ignwps".to_string()),
			..detail(5)
		},
		SchemeDetail {
			objective: Some("Orphaned row for a scheme that was removed.".to_string()),
			eligibility: strings(&["Anyone"]),
			..detail(99)
		},
	];

	(master, details)
}

pub fn sample_store() -> SchemeStore {
	let (master, details) = sample_tables();

	SchemeStore::from_tables(master, details)
}

/// Master and details tables written as JSON into a fresh temp directory that is removed on
/// drop.
pub struct TempTables {
	dir: PathBuf,
	pub master_path: PathBuf,
	pub details_path: PathBuf,
}
impl TempTables {
	pub fn write(master: &[SchemeMaster], details: &[SchemeDetail]) -> Result<Self> {
		Self::write_raw(&serde_json::to_string(master)?, &serde_json::to_string(details)?)
	}

	pub fn write_raw(master_json: &str, details_json: &str) -> Result<Self> {
		static COUNTER: AtomicU64 = AtomicU64::new(0);

		let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
		let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
		let dir = env::temp_dir()
			.join(format!("yojana_tables_{nanos}_{}_{ordinal}", std::process::id()));

		fs::create_dir_all(&dir)?;

		let tables = Self {
			master_path: dir.join("scheme_master.json"),
			details_path: dir.join("scheme_details.json"),
			dir,
		};

		tables.overwrite_raw(master_json, details_json)?;

		Ok(tables)
	}

	pub fn overwrite(&self, master: &[SchemeMaster], details: &[SchemeDetail]) -> Result<()> {
		self.overwrite_raw(&serde_json::to_string(master)?, &serde_json::to_string(details)?)
	}

	pub fn overwrite_raw(&self, master_json: &str, details_json: &str) -> Result<()> {
		fs::write(&self.master_path, master_json)?;
		fs::write(&self.details_path, details_json)?;

		Ok(())
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}
}
impl Drop for TempTables {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.dir);
	}
}

pub fn test_config(master_path: &Path, details_path: &Path) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage {
			master_path: master_path.to_path_buf(),
			details_path: details_path.to_path_buf(),
		},
		providers: ProviderConfigs {
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-model".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			web_search: WebSearchProviderConfig {
				enabled: true,
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/search".to_string(),
				query_prefix: "Indian government schemes".to_string(),
				max_results: 5,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		search: Search::default(),
		eligibility: Eligibility::default(),
		security: Security { bind_localhost_only: true, admin_auth_token: None },
	}
}

/// Config whose storage paths point nowhere; for services built from in-memory tables.
pub fn detached_config() -> Config {
	test_config(Path::new("missing/scheme_master.json"), Path::new("missing/scheme_details.json"))
}

enum StubReply {
	Text(String),
	Fail(String),
}

/// Language model stand-in that returns a canned reply and records every request.
pub struct StubLlm {
	reply: StubReply,
	calls: AtomicUsize,
	requests: Mutex<Vec<Vec<Value>>>,
}
impl StubLlm {
	pub fn replying(text: impl Into<String>) -> Arc<Self> {
		Arc::new(Self::new(StubReply::Text(text.into())))
	}

	pub fn failing(message: impl Into<String>) -> Arc<Self> {
		Arc::new(Self::new(StubReply::Fail(message.into())))
	}

	fn new(reply: StubReply) -> Self {
		Self { reply, calls: AtomicUsize::new(0), requests: Mutex::new(Vec::new()) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn last_request(&self) -> Option<Vec<Value>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).last().cloned()
	}
}
impl LlmProvider for StubLlm {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, yojana_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

		let reply = match &self.reply {
			StubReply::Text(text) => Ok(text.clone()),
			StubReply::Fail(message) => {
				Err(yojana_providers::Error::InvalidResponse { message: message.clone() })
			},
		};

		Box::pin(async move { reply })
	}
}

/// Web search stand-in with canned results that records every query.
pub struct StubWebSearch {
	results: Vec<WebResult>,
	failure: Option<String>,
	calls: AtomicUsize,
	queries: Mutex<Vec<String>>,
}
impl StubWebSearch {
	pub fn empty() -> Arc<Self> {
		Self::with_results(Vec::new())
	}

	pub fn with_results(results: Vec<WebResult>) -> Arc<Self> {
		Arc::new(Self {
			results,
			failure: None,
			calls: AtomicUsize::new(0),
			queries: Mutex::new(Vec::new()),
		})
	}

	pub fn failing(message: impl Into<String>) -> Arc<Self> {
		Arc::new(Self {
			results: Vec::new(),
			failure: Some(message.into()),
			calls: AtomicUsize::new(0),
			queries: Mutex::new(Vec::new()),
		})
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn queries(&self) -> Vec<String> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl WebSearchProvider for StubWebSearch {
	fn search<'a>(
		&'a self,
		_cfg: &'a WebSearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, yojana_providers::Result<Vec<WebResult>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).push(query.to_string());

		let reply = match &self.failure {
			Some(message) => {
				Err(yojana_providers::Error::InvalidResponse { message: message.clone() })
			},
			None => Ok(self.results.clone()),
		};

		Box::pin(async move { reply })
	}
}

pub fn web_result(url: &str, title: &str, content: &str) -> WebResult {
	WebResult { url: url.to_string(), title: title.to_string(), content: content.to_string() }
}

pub fn stub_providers(llm: Arc<StubLlm>, web_search: Arc<StubWebSearch>) -> Providers {
	Providers::new(llm, web_search)
}

/// Service over in-memory tables with stubbed providers.
pub fn stub_service(
	store: SchemeStore,
	llm: Arc<StubLlm>,
	web_search: Arc<StubWebSearch>,
) -> YojanaService {
	YojanaService::with_providers(detached_config(), store, stub_providers(llm, web_search))
}

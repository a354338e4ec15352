use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use yojana_api::{routes, state::AppState};
use yojana_service::{Providers, YojanaService};
use yojana_testkit::{
	StubLlm, StubWebSearch, TempTables, detached_config, farmer_aid_tables, sample_store,
	sample_tables, stub_service, test_config,
};

fn sample_app(llm_reply: &str) -> Router {
	let service = stub_service(sample_store(), StubLlm::replying(llm_reply), StubWebSearch::empty());

	routes::router(AppState::from_service(service))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Failed to call the router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = if body.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&body).expect("Failed to parse response.")
	};

	(status, json)
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_ok() {
	let request = Request::builder().uri("/health").body(Body::empty()).expect("request");
	let (status, _) = call(sample_app("[]"), request).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn search_returns_local_records() {
	let (status, json) = call(
		sample_app("[]"),
		post_json("/v1/schemes/search", serde_json::json!({ "query": "women pension" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["stage"], "local");
	assert_eq!(json["items"][0]["scheme_id"], 5);
	assert_eq!(json["items"][0]["source"], "local");
	assert_eq!(json["items"][1]["scheme_name"], "Udyogini");
}

#[tokio::test]
async fn search_reports_fallback_stage() {
	let (status, json) = call(
		sample_app("[]"),
		post_json("/v1/schemes/search", serde_json::json!({ "query": "xyz123" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["stage"], "fallback");
	assert_eq!(json["items"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn blank_query_is_rejected() {
	let (status, json) = call(
		sample_app("[]"),
		post_json("/v1/schemes/search_text", serde_json::json!({ "query": "   " })),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn search_text_returns_formatted_blocks() {
	let (status, json) = call(
		sample_app("[]"),
		post_json("/v1/schemes/search_text", serde_json::json!({ "query": "widow" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		json["text"],
		"Scheme 1: Indira Gandhi National Widow Pension [local]\nMonthly pension for widows."
	);
}

#[tokio::test]
async fn lists_joined_schemes() {
	let request = Request::builder().uri("/v1/schemes").body(Body::empty()).expect("request");
	let (status, json) = call(sample_app("[]"), request).await;
	let items = json["items"].as_array().expect("items array");

	assert_eq!(status, StatusCode::OK);
	assert_eq!(items.len(), 5);
	assert_eq!(items[0]["scheme_name"], "PM Kisan Samman Nidhi");
	assert_eq!(items[0]["objective"], "Income support to landholding farmer families.");
}

#[tokio::test]
async fn eligibility_accepts_profile_text() {
	let llm = StubLlm::replying("[{\"scheme_id\": 5, \"eligibility_reason\": \"widow\"}]");
	let service = stub_service(sample_store(), llm.clone(), StubWebSearch::empty());
	let app = routes::router(AppState::from_service(service));
	let (status, json) = call(
		app,
		post_json(
			"/v1/schemes/eligibility",
			serde_json::json!({ "profile_text": "I am a widow aged 62" }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["items"][0]["scheme_id"], 5);
	assert_eq!(json["items"][0]["eligibility_reason"], "widow");
	assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn eligibility_accepts_structured_profile() {
	let llm = StubLlm::replying("[{\"scheme_id\": 1, \"eligibility_reason\": \"farmer\"}]");
	let service = stub_service(sample_store(), llm.clone(), StubWebSearch::empty());
	let app = routes::router(AppState::from_service(service));
	let (status, json) = call(
		app,
		post_json(
			"/v1/schemes/eligibility",
			serde_json::json!({ "profile": { "occupation": "farmer", "has_land": true } }),
		),
	)
	.await;
	let request = llm.last_request().expect("Model request must be recorded.");
	let user_prompt = request[1]["content"].as_str().expect("User prompt must be text.");

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["items"][0]["scheme_name"], "PM Kisan Samman Nidhi");
	assert!(user_prompt.contains("occupation: farmer\nhas_land: yes"));
}

#[tokio::test]
async fn eligibility_without_profile_is_rejected() {
	let (status, json) = call(
		sample_app("[]"),
		post_json("/v1/schemes/eligibility", serde_json::json!({ "profile_text": "" })),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn malformed_model_reply_yields_empty_items() {
	let (status, json) = call(
		sample_app("no json here"),
		post_json("/v1/schemes/eligibility", serde_json::json!({ "profile_text": "farmer" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["items"], serde_json::json!([]));
}

#[tokio::test]
async fn reload_requires_admin_token_when_configured() {
	let mut cfg = detached_config();

	cfg.security.admin_auth_token = Some("secret".to_string());

	let service = YojanaService::with_providers(
		cfg,
		sample_store(),
		Providers::new(StubLlm::replying("[]"), StubWebSearch::empty()),
	);
	let app = routes::admin_router(AppState::from_service(service));
	let request =
		Request::builder().method("POST").uri("/v1/admin/reload").body(Body::empty()).expect("request");
	let (status, json) = call(app, request).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(json["error_code"], "unauthorized");
}

#[tokio::test]
async fn reload_failure_is_a_storage_error() {
	let mut cfg = detached_config();

	cfg.security.admin_auth_token = Some("secret".to_string());

	let service = YojanaService::with_providers(
		cfg,
		sample_store(),
		Providers::new(StubLlm::replying("[]"), StubWebSearch::empty()),
	);
	let app = routes::admin_router(AppState::from_service(service));
	let request = Request::builder()
		.method("POST")
		.uri("/v1/admin/reload")
		.header("authorization", "Bearer secret")
		.body(Body::empty())
		.expect("request");
	let (status, json) = call(app, request).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(json["error_code"], "storage_error");
}

#[tokio::test]
async fn reload_swaps_tables() {
	let (master_rows, detail_rows) = farmer_aid_tables();
	let tables = TempTables::write(&master_rows, &detail_rows).expect("Failed to write tables.");
	let service = YojanaService::open(
		test_config(&tables.master_path, &tables.details_path),
		Providers::new(StubLlm::replying("[]"), StubWebSearch::empty()),
	)
	.expect("Failed to open service.");
	let state = AppState::from_service(service);
	let (sample_master, sample_details) = sample_tables();

	tables.overwrite(&sample_master, &sample_details).expect("Failed to overwrite tables.");

	let request =
		Request::builder().method("POST").uri("/v1/admin/reload").body(Body::empty()).expect("request");
	let (status, json) = call(routes::admin_router(state.clone()), request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["master_count"], 6);
	assert_eq!(json["details_count"], 6);

	let request = Request::builder().uri("/v1/schemes").body(Body::empty()).expect("request");
	let (_, json) = call(routes::router(state), request).await;

	assert_eq!(json["items"].as_array().map(Vec::len), Some(5));
}

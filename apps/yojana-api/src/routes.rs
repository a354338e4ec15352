use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use yojana_service::{
	EligibleScheme, Error as ServiceError, RetrievalStage, SchemeRecord, UserProfile,
};
use yojana_storage::JoinedScheme;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
	pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
	pub stage: RetrievalStage,
	pub items: Vec<SchemeRecord>,
}

#[derive(Debug, Serialize)]
pub struct SearchTextResponse {
	pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SchemesResponse {
	pub items: Vec<JoinedScheme>,
}

/// Either a ready profile summary or a structured profile to summarize. `profile_text` wins when
/// both are present and non-blank.
#[derive(Debug, Default, Deserialize)]
pub struct EligibilityRequest {
	#[serde(default)]
	pub profile_text: Option<String>,
	#[serde(default)]
	pub profile: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
	pub items: Vec<EligibleScheme>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::Storage { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/schemes", get(list_schemes))
		.route("/v1/schemes/search", post(search))
		.route("/v1/schemes/search_text", post(search_text))
		.route("/v1/schemes/eligibility", post(eligibility))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/reload", post(reload)).with_state(state)
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let query = require_text("query", &payload.query)?;
	let retrieval = state
		.service
		.retrieve(query, state.service.cfg.search.list_limit as usize)
		.await;

	Ok(Json(SearchResponse { stage: retrieval.stage, items: retrieval.records }))
}

async fn search_text(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchTextResponse>, ApiError> {
	let query = require_text("query", &payload.query)?;
	let text = state.service.search_formatted(query).await;

	Ok(Json(SearchTextResponse { text }))
}

async fn list_schemes(State(state): State<AppState>) -> Json<SchemesResponse> {
	Json(SchemesResponse { items: state.service.all_schemes() })
}

async fn eligibility(
	State(state): State<AppState>,
	Json(payload): Json<EligibilityRequest>,
) -> Result<Json<EligibilityResponse>, ApiError> {
	let profile_text = eligibility_input(payload)?;
	let items = state.service.get_eligible_schemes(&profile_text).await;

	Ok(Json(EligibilityResponse { items }))
}

async fn reload(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<yojana_service::ReloadReport>, ApiError> {
	if let Some(expected) = state.admin_auth_token.as_deref()
		&& read_bearer_token(&headers) != Some(expected)
	{
		return Err(json_error(
			StatusCode::UNAUTHORIZED,
			"unauthorized",
			"A valid admin bearer token is required.",
		));
	}

	let report = state.service.reload_store()?;

	Ok(Json(report))
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ServiceError> {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return Err(ServiceError::InvalidRequest { message: format!("{field} must not be empty.") });
	}

	Ok(trimmed)
}

fn eligibility_input(payload: EligibilityRequest) -> Result<String, ServiceError> {
	if let Some(text) = payload.profile_text.as_deref()
		&& !text.trim().is_empty()
	{
		return Ok(text.to_string());
	}
	if let Some(profile) = payload.profile.filter(|profile| !profile.is_empty()) {
		return Ok(profile.summary());
	}

	Err(ServiceError::InvalidRequest {
		message: "Either profile_text or a non-empty profile is required.".to_string(),
	})
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_wins_over_profile() {
		let payload = EligibilityRequest {
			profile_text: Some("farmer".to_string()),
			profile: Some(UserProfile { age: Some(30), ..Default::default() }),
		};

		assert_eq!(eligibility_input(payload).expect("input"), "farmer");
	}

	#[test]
	fn blank_text_falls_back_to_profile_summary() {
		let payload = EligibilityRequest {
			profile_text: Some("  ".to_string()),
			profile: Some(UserProfile { occupation: Some("farmer".to_string()), ..Default::default() }),
		};

		assert_eq!(
			eligibility_input(payload).expect("input"),
			"occupation: farmer\nlanguage: English"
		);
	}

	#[test]
	fn missing_inputs_are_rejected() {
		let payload = EligibilityRequest { profile: Some(UserProfile::default()), ..Default::default() };

		assert!(matches!(
			eligibility_input(payload),
			Err(ServiceError::InvalidRequest { .. })
		));
	}

	#[test]
	fn bearer_token_is_trimmed() {
		let mut headers = HeaderMap::new();

		headers.insert(AUTHORIZATION, "Bearer  secret ".parse().expect("valid header"));

		assert_eq!(read_bearer_token(&headers), Some("secret"));

		headers.insert(AUTHORIZATION, "Basic secret".parse().expect("valid header"));

		assert_eq!(read_bearer_token(&headers), None);
	}
}

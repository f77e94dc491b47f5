use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use estate_service::{
	CreateFeatureRequest, CreateNoteRequest, CreatePropertyRequest, Error as ServiceError,
	FeatureResponse, NoteResponse, PropertyListRequest, PropertyResponse, RankRequest,
	ScoredProperty, UpdatePropertyRequest,
};

use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/properties", post(create_property).get(list_properties))
		.route("/v1/properties/rank", post(rank_properties))
		.route("/v1/properties/filters", post(preview_filters))
		.route(
			"/v1/properties/{property_id}",
			get(get_property).patch(update_property).delete(delete_property),
		)
		.route("/v1/property-notes", post(create_note))
		.route("/v1/property-notes/property/{property_id}", get(list_notes))
		.route("/v1/property-notes/{note_id}", get(get_note).delete(delete_note))
		.route("/v1/property-features", post(create_feature))
		.route("/v1/property-features/property/{property_id}", get(get_feature_by_property))
		.route("/v1/property-features/{feature_id}", get(get_feature))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn create_property(
	State(state): State<AppState>,
	payload: Result<Json<CreatePropertyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyResponse>), ApiError> {
	let Json(payload) = payload?;
	let response = state.service.create_property(payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn list_properties(
	State(state): State<AppState>,
	query: Result<Query<PropertyListRequest>, QueryRejection>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
	let Query(query) = query?;
	let response = state.service.list_properties(query).await?;

	Ok(Json(response))
}

async fn rank_properties(
	State(state): State<AppState>,
	payload: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<Vec<ScoredProperty>>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.rank(&payload.text).await?;

	Ok(Json(response))
}

async fn preview_filters(
	State(state): State<AppState>,
	payload: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.preview_filters(&payload.text).await?;

	Ok(Json(response))
}

async fn get_property(
	State(state): State<AppState>,
	Path(property_id): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
	let response = state.service.get_property(parse_id("property_id", &property_id)?).await?;

	Ok(Json(response))
}

async fn update_property(
	State(state): State<AppState>,
	Path(property_id): Path<String>,
	payload: Result<Json<UpdatePropertyRequest>, JsonRejection>,
) -> Result<Json<PropertyResponse>, ApiError> {
	let property_id = parse_id("property_id", &property_id)?;
	let Json(payload) = payload?;
	let response = state.service.update_property(property_id, payload).await?;

	Ok(Json(response))
}

async fn delete_property(
	State(state): State<AppState>,
	Path(property_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_property(parse_id("property_id", &property_id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn create_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
	let author_id = acting_user(&headers)?;
	let Json(payload) = payload?;
	let response = state.service.create_note(author_id, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn list_notes(
	State(state): State<AppState>,
	Path(property_id): Path<String>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
	let response = state.service.list_notes(parse_id("property_id", &property_id)?).await?;

	Ok(Json(response))
}

async fn get_note(
	State(state): State<AppState>,
	Path(note_id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
	let response = state.service.get_note(parse_id("note_id", &note_id)?).await?;

	Ok(Json(response))
}

async fn delete_note(
	State(state): State<AppState>,
	Path(note_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_note(parse_id("note_id", &note_id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn create_feature(
	State(state): State<AppState>,
	payload: Result<Json<CreateFeatureRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeatureResponse>), ApiError> {
	let Json(payload) = payload?;
	let response = state.service.create_feature(payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn get_feature_by_property(
	State(state): State<AppState>,
	Path(property_id): Path<String>,
) -> Result<Json<FeatureResponse>, ApiError> {
	let response =
		state.service.get_feature_by_property(parse_id("property_id", &property_id)?).await?;

	Ok(Json(response))
}

async fn get_feature(
	State(state): State<AppState>,
	Path(feature_id): Path<String>,
) -> Result<Json<FeatureResponse>, ApiError> {
	let response = state.service.get_feature(parse_id("feature_id", &feature_id)?).await?;

	Ok(Json(response))
}

fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
	Uuid::parse_str(raw).map_err(|_| {
		json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			format!("{field} must be a UUID."),
			Some(vec![format!("$.{field}")]),
		)
	})
}

fn acting_user(headers: &HeaderMap) -> Result<Uuid, ApiError> {
	let invalid = || {
		json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			format!("{USER_ID_HEADER} header must carry a UUID."),
			Some(vec![USER_ID_HEADER.to_string()]),
		)
	};
	let raw = headers.get(USER_ID_HEADER).ok_or_else(invalid)?;
	let raw = raw.to_str().map_err(|_| invalid())?;

	Uuid::parse_str(raw.trim()).map_err(|_| invalid())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			ServiceError::Conflict { message } =>
				json_error(StatusCode::CONFLICT, "CONFLICT", message, None),
			ServiceError::MalformedResponse { message } => {
				tracing::error!(error = %message, "Completion returned malformed JSON.");

				json_error(StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE", message, None)
			},
			ServiceError::EmptyCompletion => json_error(
				StatusCode::BAD_GATEWAY,
				"EMPTY_COMPLETION",
				"Completion returned no content.",
				None,
			),
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Completion provider failed.");

				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", "Completion provider failed.", None)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage operation failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL_ERROR",
					"Internal error.",
					None,
				)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), None)
	}
}

impl From<QueryRejection> for ApiError {
	fn from(err: QueryRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

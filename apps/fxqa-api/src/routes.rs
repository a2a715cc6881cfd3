use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use fxqa_service::{AskRequest, Error as ServiceError};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
	pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	error: String,
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
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Model provider call failed.");

				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Document store call failed.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, error: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new().route("/health", get(health)).route("/chat", post(chat)).with_state(state)
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn chat(
	State(state): State<AppState>,
	payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.ask(payload).await?;

	Ok(Json(ChatResponse { answer: response.answer }))
}

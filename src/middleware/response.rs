use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Success envelope shared by every endpoint: `{ "data"?: T, "message": "..." }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip)]
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `data`
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(Some(data), message, StatusCode::OK)
    }

    /// 201 Created carrying the new resource
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(Some(data), message, StatusCode::CREATED)
    }

    /// 200 OK with no `data` key
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(None, message, StatusCode::OK)
    }

    pub fn with_status(data: Option<T>, message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            data,
            message: message.into(),
            status_code,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self) {
            Ok(envelope) => (self.status_code, Json(envelope)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Failed to serialize response data" })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

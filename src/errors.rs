use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Failure form of the response envelope.
///
/// Mirrors [`crate::ApiResponse`] so clients can read `status`, `errors`,
/// `result` and `description` without caring whether the call succeeded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "failed",
    "errors": "Not found: order detail 42 not found",
    "result": null,
    "description": "Data yang diminta tidak ditemukan.",
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Always `"failed"`
    pub status: String,
    /// Human-readable error message
    pub errors: String,
    /// Always null on failure
    pub result: Option<serde_json::Value>,
    /// Indonesian summary of what went wrong
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The admin exists but is not allowed to act right now.
    #[error("Inactive admin: {0}")]
    InactiveAdmin(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Convenience constructor for wrapping string-based database errors.
    pub fn database_error_message(message: impl Into<String>) -> Self {
        ServiceError::DatabaseError(DbErr::Custom(message.into()))
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InactiveAdmin(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Store and internal failures return generic messages.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Indonesian summary placed in the envelope's `description`.
    pub fn description(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "Gagal mengeksekusi query pada database.",
            Self::NotFound(_) => "Data yang diminta tidak ditemukan.",
            Self::ValidationError(_) => "Gagal memvalidasi data yang masuk.",
            Self::Conflict(_) => "Permintaan bertentangan dengan status data saat ini.",
            Self::InternalError(_) | Self::Other(_) => "Terjadi kesalahan internal pada server.",
            Self::Unauthorized(_) => "Request ini tidak menyertakan token akses.",
            Self::Forbidden(_) => "Gagal mengecek user ID pada request ini.",
            Self::InactiveAdmin(_) => {
                "Tidak dapat melanjutkan request karena Admin berstatus tidak aktif."
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let err = ErrorResponse {
            status: "failed".to_string(),
            errors: self.response_message(),
            result: None,
            description: self.description().to_string(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

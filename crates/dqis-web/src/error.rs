//! Error types for the server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dqis_core::QualityError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("No file was uploaded. Send it in the multipart field 'file'.")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    Multipart(String),

    #[error(transparent)]
    Analysis(#[from] QualityError),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebError {
    pub fn code(&self) -> &'static str {
        match self {
            WebError::MissingFile => "MISSING_FILE",
            WebError::Multipart(_) => "INVALID_UPLOAD",
            WebError::Analysis(e) => e.error_code(),
            WebError::Template(_) | WebError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<handlebars::RenderError> for WebError {
    fn from(e: handlebars::RenderError) -> Self {
        WebError::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for WebError {
    fn from(e: handlebars::TemplateError) -> Self {
        WebError::Template(e.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::MissingFile => (StatusCode::BAD_REQUEST, self.to_string()),
            WebError::Multipart(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WebError::Analysis(e) if e.is_data_error() => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.user_message())
            }
            WebError::Analysis(e) => {
                tracing::error!(detail = %e, "Analysis failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The analysis failed. Check server logs for details.".to_string(),
                )
            }
            WebError::Template(msg) | WebError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "code": self.code(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

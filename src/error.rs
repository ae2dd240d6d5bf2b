use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or corrupt model/encoder artifact
    #[error("Artifact error: {0}")]
    Artifact(String),
    /// Label outside an encoder's known set
    #[error("Unrecognized {category} category: '{label}'")]
    UnknownCategory { category: String, label: String },
    /// Rejected form or API input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Model evaluation failure
    #[error("Prediction failed: {0}")]
    Prediction(String),
    /// CSV summary could not be produced
    #[error("Export failed: {0}")]
    Export(String),
    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unknown_category(category: impl Into<String>, label: impl Into<String>) -> Self {
        Self::UnknownCategory {
            category: category.into(),
            label: label.into(),
        }
    }

    /// Errors caused by what the user submitted, as opposed to the service itself
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory { .. } | Self::InvalidInput(_) | Self::Prediction(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_user_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

pub fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::Artifact(_) => "artifact_error",
        AppError::UnknownCategory { .. } => "unknown_category",
        AppError::InvalidInput(_) => "invalid_input",
        AppError::Prediction(_) => "prediction_error",
        AppError::Export(_) => "export_error",
        AppError::Internal(_) => "internal_error",
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

use axum::http::StatusCode;
use thiserror::Error;

/// Failures raised by the progress core.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("{0}")]
    Validation(String),
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("storage failure: {0}")]
    Io(#[from] std::io::Error),
}

impl ProgressError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self::internal_message(err.to_string())
    }

    pub fn internal_message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ProgressError> for AppError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::Validation(message) => Self::bad_request(message),
            ProgressError::Parse(err) => {
                Self::bad_request(format!("could not read progress document: {err}"))
            }
            ProgressError::Io(err) => Self::internal(err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

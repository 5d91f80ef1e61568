// Request-level error taxonomy. Client input problems carry their exact
// response message; everything else collapses to a generic 500 body while
// the full detail goes to the server log.
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing 'file' part in the request.")]
    MissingFile,
    #[error("No file selected.")]
    NoFileSelected,
    #[error("The uploaded file is not a valid image.")]
    InvalidImage,
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientInput,
    Storage,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::MissingFile | AppError::NoFileSelected | AppError::InvalidImage => {
                ErrorKind::ClientInput
            }
            AppError::Storage(_) => ErrorKind::Storage,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
            ErrorKind::Storage | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the caller sees. Never exposes internal detail.
    fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::ClientInput => self.to_string(),
            ErrorKind::Storage | ErrorKind::Internal => {
                "An internal server error occurred.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Storage(e) => tracing::error!(error = %e, "prediction could not be recorded"),
            AppError::Internal(e) => tracing::error!(error = ?e, "unexpected error while handling prediction"),
            client => tracing::error!("{client}"),
        }
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400_with_their_message() {
        for err in [AppError::MissingFile, AppError::NoFileSelected, AppError::InvalidImage] {
            assert_eq!(err.kind(), ErrorKind::ClientInput);
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(
            AppError::InvalidImage.public_message(),
            "The uploaded file is not a valid image."
        );
    }

    #[test]
    fn internal_errors_never_leak_detail() {
        let err = AppError::Internal(anyhow::anyhow!("tensor shape mismatch at layer 3"));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "An internal server error occurred.");
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure taxonomy of the aggregation model and its collaborators. Every
/// variant is terminal for the one operation that produced it; none aborts
/// the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load the nutrition log")]
    Load(#[source] sqlx::Error),

    #[error("failed to save the food entry")]
    Add(#[source] sqlx::Error),

    #[error("failed to remove the food entry")]
    Remove(#[source] sqlx::Error),

    #[error("food analysis failed: {0}")]
    Analysis(String),

    #[error("analysis API key is not configured")]
    MissingApiKey,

    #[error("barcode lookup failed: {0}")]
    Lookup(String),

    #[error("product not found")]
    NotFound,

    #[error("{0}")]
    InvalidGoal(String),

    #[error("{0}")]
    InvalidEntry(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Load(_) | AppError::Add(_) | AppError::Remove(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Analysis(_) | AppError::Lookup(_) => StatusCode::BAD_GATEWAY,
            AppError::MissingApiKey | AppError::InvalidGoal(_) | AppError::InvalidEntry(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn statuses_match_taxonomy() {
        let cases = [
            (AppError::NotFound.into_response(), StatusCode::NOT_FOUND),
            (
                AppError::MissingApiKey.into_response(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::InvalidGoal("goal must be positive".into()).into_response(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Analysis("unparsable response".into()).into_response(),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (response, expected) in cases {
            assert_eq!(response.status(), expected);
        }
    }
}

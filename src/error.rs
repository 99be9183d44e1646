use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;
use tracing::error;

/// Request-level failure taxonomy. Every handler error funnels through this
/// enum and leaves the server as a JSON `{"message": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Expired(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// The rejection every auth guard maps to.
    pub fn invalid_token() -> Self {
        Self::Auth("Invalid token".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Auth(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            ApiError::Expired(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Unexpected(e) => {
                error!(error = %e, "unexpected failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            status_of(ApiError::validation("Send all required fields")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ApiError::invalid_token()), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ApiError::not_found("Habit not found")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::Conflict("username taken".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::Expired("this code has expired".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Unexpected(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unexpected_never_leaks_details() {
        let body = ApiError::Unexpected(anyhow::anyhow!("connection refused to 10.0.0.1"));
        let response = body.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // the concrete cause stays in the logs
    }
}

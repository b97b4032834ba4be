use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use warden_core::AuthError;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %err, "Unhandled error");
        AppError::internal(anyhow!("Internal server error"))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::EmptyCredentials
            | AuthError::TooLong
            | AuthError::InvalidEmail
            | AuthError::InvalidUsername
            | AuthError::InvalidRole
            | AuthError::InvalidVerificationType
            | AuthError::NoChange => StatusCode::BAD_REQUEST,

            // Both collapse to one message so clients cannot probe for accounts.
            AuthError::NoUserFound | AuthError::IncorrectPassword => {
                return AppError::unauthorized("Invalid credentials");
            }

            AuthError::EmptyToken
            | AuthError::InvalidToken
            | AuthError::InvalidIssuer
            | AuthError::InvalidTokenType => StatusCode::UNAUTHORIZED,

            AuthError::NotVerified | AuthError::InvalidSignupMethod => StatusCode::FORBIDDEN,

            AuthError::VerificationNotFound => StatusCode::NOT_FOUND,

            AuthError::DuplicateKey => StatusCode::CONFLICT,

            AuthError::Store(_) | AuthError::Internal(_) => {
                tracing::error!(error = %err, "Internal error");
                return AppError::internal(anyhow!("Internal server error"));
            }
        };

        AppError::new(status, anyhow!(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failures_share_one_response() {
        let a = AppError::from(AuthError::NoUserFound);
        let b = AppError::from(AuthError::IncorrectPassword);
        assert_eq!(a.status, StatusCode::UNAUTHORIZED);
        assert_eq!(a.status, b.status);
        assert_eq!(a.error.to_string(), b.error.to_string());
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(
            AppError::from(AuthError::InvalidEmail).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::InvalidTokenType).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::NotVerified).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::VerificationNotFound).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(AuthError::DuplicateKey).status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_infrastructure_errors_are_masked() {
        let err = AppError::from(AuthError::Store(anyhow!("password=hunter2 connection reset")));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.error.to_string().contains("hunter2"));
    }
}

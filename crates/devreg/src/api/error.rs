//! Unified API error handling with structured responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::AuthError;
use crate::device::DeviceError;

/// Message of every 401 response.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Message of every 403 response.
pub const FORBIDDEN_MESSAGE: &str = "current user is not authorized to access this resource";

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("current user is not authorized to access this resource")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed(&'static [&'static str]),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the `error` key in the response body.
    fn error_kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::MethodNotAllowed(_) => "method not allowed",
            Self::Internal(_) => "internal server error",
        }
    }

    fn body(&self) -> ErrorResponse {
        let message = match self {
            Self::BadRequest(msg) => Some(msg.clone()),
            Self::Unauthorized => Some(INVALID_CREDENTIALS.to_string()),
            Self::Forbidden => Some(FORBIDDEN_MESSAGE.to_string()),
            Self::NotFound | Self::MethodNotAllowed(_) | Self::Internal(_) => None,
        };

        let valid_methods = match self {
            Self::MethodNotAllowed(methods) => Some(methods.to_vec()),
            _ => None,
        };

        ErrorResponse {
            error: self.error_kind(),
            message,
            valid_methods,
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_methods: Option<Vec<&'static str>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Internal(detail) => {
                error!(detail = %detail, "API error");
            }
            _ => {
                debug!(status = status.as_u16(), message = %self, "Client error");
            }
        }

        let mut response = (status, Json(self.body())).into_response();

        match &self {
            ApiError::Unauthorized => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Basic realm=\"Authentication Required\""),
                );
            }
            ApiError::MethodNotAllowed(methods) => {
                if let Ok(allow) = HeaderValue::from_str(&methods.join(", ")) {
                    response.headers_mut().insert(header::ALLOW, allow);
                }
            }
            _ => {}
        }

        response
    }
}

/// Unexpected failures become opaque 500s.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Every authentication failure collapses to the same 401.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(msg) => ApiError::Internal(format!("authentication: {msg}")),
            _ => ApiError::Unauthorized,
        }
    }
}

impl From<DeviceError> for ApiError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::NotFound(_) => ApiError::NotFound,
            DeviceError::Forbidden(_) => ApiError::Forbidden,
            DeviceError::Invalid(e) => ApiError::BadRequest(e.to_string()),
            DeviceError::Storage(e) => ApiError::Internal(format!("{e:#}")),
        }
    }
}

/// Lets the auth extractors reject with the API error body.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenError;
    use crate::device::ValidationError;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::bad_request("").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed(&["GET"]).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::internal("").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_failures_are_indistinguishable() {
        let errors = [
            AuthError::MissingCredentials,
            AuthError::InvalidAuthHeader,
            AuthError::InvalidPassword,
            AuthError::InvalidToken(TokenError::Expired),
            AuthError::InvalidToken(TokenError::Invalid("bad signature".to_string())),
            AuthError::BasicRequired,
        ];

        for err in errors {
            let api_err = ApiError::from(err);
            assert!(matches!(api_err, ApiError::Unauthorized));
            assert_eq!(
                serde_json::to_value(api_err.body()).unwrap(),
                json!({"error": "unauthorized", "message": "Invalid credentials"})
            );
        }
    }

    #[test]
    fn test_device_error_mapping() {
        assert!(matches!(
            ApiError::from(DeviceError::NotFound(1)),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from(DeviceError::Forbidden(1)),
            ApiError::Forbidden
        ));
        assert!(matches!(
            ApiError::from(DeviceError::Storage(anyhow::anyhow!("disk on fire"))),
            ApiError::Internal(_)
        ));

        let err = ApiError::from(DeviceError::Invalid(ValidationError::EmptyPatch));
        assert_eq!(
            serde_json::to_value(err.body()).unwrap(),
            json!({"error": "bad request", "message": "The request is missing all data"})
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::internal("secret stack trace").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "internal server error"})
        );
    }

    #[tokio::test]
    async fn test_method_not_allowed_response() {
        let response = ApiError::MethodNotAllowed(&["GET", "HEAD", "OPTIONS"]).into_response();
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, HEAD, OPTIONS"
        );
        assert_eq!(
            body_json(response).await,
            json!({"error": "method not allowed", "valid_methods": ["GET", "HEAD", "OPTIONS"]})
        );
    }

    #[tokio::test]
    async fn test_unauthorized_has_challenge() {
        let response = ApiError::Unauthorized.into_response();
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}

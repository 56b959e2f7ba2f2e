use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    Json,
};
use kfdash_api::ApiError as BackendError;
use kfdash_core::domain::DomainError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: ApiError,
}

impl AppError {
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("BAD_REQUEST", message),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHORIZED", message),
        )
    }

    /// Transient; clients are expected to retry
    pub fn not_ready(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new("NOT_READY", message),
        )
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new("NOT_CONFIGURED", message),
        )
    }

    pub fn bad_gateway(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiError::new(code, message))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(
                status = self.status.as_u16(),
                code = %self.error.code,
                "{}",
                self.error.message
            );
        }
        (self.status, Json(self.error)).into_response()
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match &err {
            BackendError::AuthenticationFailed(_) => AppError::unauthorized(err.to_string()),
            BackendError::NotFound(_) => AppError::not_found(err.to_string()),
            BackendError::InvalidConfig(_) => AppError::bad_request(err.to_string()),
            BackendError::Status { status, .. } => {
                let mut app_err = AppError::bad_gateway("UPSTREAM_ERROR", err.to_string());
                app_err.error = app_err.error.with_details(format!("upstream status {}", status));
                app_err
            }
            BackendError::NetworkError(_) => {
                AppError::bad_gateway("UPSTREAM_UNAVAILABLE", err.to_string())
            }
            BackendError::SerializationError(_) => {
                AppError::bad_gateway("UPSTREAM_ERROR", err.to_string())
            }
            BackendError::Internal(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Api(api_err) => api_err.into(),
            DomainError::NotReady(message) => AppError::not_ready(message),
            DomainError::PaginationLimitExceeded { .. } => {
                AppError::bad_gateway("PAGINATION_LIMIT_EXCEEDED", err.to_string())
            }
            DomainError::InvalidConfig(_) => AppError::bad_request(err.to_string()),
            DomainError::NotFound(_) => AppError::not_found(err.to_string()),
            DomainError::Kubernetes(_) => {
                AppError::bad_gateway("KUBERNETES_ERROR", err.to_string())
            }
            DomainError::InternalError(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, AppError>;

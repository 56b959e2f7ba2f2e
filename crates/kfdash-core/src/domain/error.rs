use kfdash_api::{
    ApiError,
    ResourceKind,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Failure from the pipelines backend, passed through untouched
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A dependency has not loaded yet; callers may retry later
    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Pagination limit exceeded: {kind} needed more than {limit} pages")]
    PaginationLimitExceeded { kind: ResourceKind, limit: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Kubernetes error: {0}")]
    Kubernetes(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn is_not_ready(&self) -> bool {
        matches!(self, DomainError::NotReady(_))
    }
}

impl From<kube::Error> for DomainError {
    fn from(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(response) if response.code == 404 => {
                DomainError::NotFound(response.message.clone())
            }
            _ => DomainError::Kubernetes(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::InternalError(format!("Serialization failed: {}", err))
    }
}

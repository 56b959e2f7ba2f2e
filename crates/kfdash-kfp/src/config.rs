use std::time::Duration;

use kfdash_api::{
    ApiError,
    ApiResult,
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a pipelines API server
#[derive(Clone)]
pub struct KfpSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub insecure: bool,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl KfpSettings {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: None,
            insecure: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for KfpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KfpSettings")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("insecure", &self.insecure)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Base URL of the v2beta1 API for a server URL
pub(crate) fn build_api_url(server_url: &str) -> ApiResult<String> {
    let trimmed = server_url.trim().trim_end_matches('/');

    if trimmed.is_empty() {
        return Err(ApiError::InvalidConfig(
            "Missing pipelines api_url".to_string(),
        ));
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ApiError::InvalidConfig(format!(
            "Invalid pipelines api_url '{}'. Expected an http:// or https:// URL",
            server_url
        )));
    }

    if trimmed.ends_with("/apis/v2beta1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}/apis/v2beta1", trimmed))
    }
}

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::config::PipelinesConfig;
use crate::domain::{
    DomainError,
    DomainResult,
};

pub const POOL_SIZE_ENV: &str = "KFDASH_HTTP_POOL_SIZE";

const DEFAULT_POOL_SIZE: usize = 10;

/// Shared client for the pipelines API. Timeouts come from config; the idle
/// pool size can be overridden with `KFDASH_HTTP_POOL_SIZE`.
pub fn create_http_client(config: &PipelinesConfig) -> DomainResult<Arc<Client>> {
    let pool_size = pool_size_from(std::env::var(POOL_SIZE_ENV).ok().as_deref());

    let client = Client::builder()
        .use_rustls_tls()
        .danger_accept_invalid_certs(config.insecure)
        .pool_max_idle_per_host(pool_size)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|e| DomainError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Arc::new(client))
}

fn pool_size_from(value: Option<&str>) -> usize {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_POOL_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_override() {
        assert_eq!(pool_size_from(None), 10);
        assert_eq!(pool_size_from(Some(" 32 ")), 32);
        assert_eq!(pool_size_from(Some("lots")), 10);
    }

    #[test]
    fn test_create_http_client() {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = create_http_client(&PipelinesConfig::default()).unwrap();
        assert_eq!(Arc::strong_count(&client), 1);
    }
}

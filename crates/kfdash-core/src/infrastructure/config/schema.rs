use std::time::Duration;

use kfdash_api::RequestOptions;
use serde::{
    Deserialize,
    Serialize,
};

use crate::application::DEFAULT_MAX_PAGES;

pub(super) const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

pub(super) const DEFAULT_CORS_ALLOW_ALL: bool = true;

pub(super) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub(super) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub(super) const DEFAULT_CATALOG_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KfdashConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub pipelines: PipelinesConfig,

    #[serde(default)]
    pub kubernetes: KubernetesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_cors_allow_all")]
    pub cors_allow_all: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_allow_all: default_cors_allow_all(),
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_cors_allow_all() -> bool {
    DEFAULT_CORS_ALLOW_ALL
}

/// Connection to the pipelines API server
#[derive(Clone, Serialize, Deserialize)]
pub struct PipelinesConfig {
    /// Base URL of the API server; pipeline routes stay unavailable without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Used when a request carries no bearer token of its own
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_catalog_refresh")]
    pub catalog_refresh_secs: u64,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            namespace: None,
            token: None,
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_pages: default_max_pages(),
            catalog_refresh_secs: default_catalog_refresh(),
            insecure: false,
        }
    }
}

impl PipelinesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn catalog_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.catalog_refresh_secs)
    }

    /// Options for requests the server makes on its own behalf
    pub fn default_request_options(&self) -> RequestOptions {
        let mut options = RequestOptions::new();
        if let Some(namespace) = self.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            options = options.with_namespace(namespace);
        }
        options
    }
}

impl std::fmt::Debug for PipelinesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelinesConfig")
            .field("api_url", &self.api_url)
            .field("namespace", &self.namespace)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("max_pages", &self.max_pages)
            .field("catalog_refresh_secs", &self.catalog_refresh_secs)
            .field("insecure", &self.insecure)
            .finish()
    }
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_catalog_refresh() -> u64 {
    DEFAULT_CATALOG_REFRESH_SECS
}

/// Cluster access for storage classes. Both unset means the kubeconfig from
/// the environment, or the in-cluster service account.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KubernetesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

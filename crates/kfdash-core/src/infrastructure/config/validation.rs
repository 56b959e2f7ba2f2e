use std::net::SocketAddr;

use super::schema::KfdashConfig;

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ConfigError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(ConfigWarning {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn summary(&self) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            "Configuration is valid".to_string()
        } else {
            format!(
                "{} error(s), {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &KfdashConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.server.bind_addr.parse::<SocketAddr>().is_err() {
            result.add_error(
                "server.bind_addr",
                format!("'{}' is not a valid socket address", config.server.bind_addr),
            );
        }

        let pipelines = &config.pipelines;
        match pipelines.api_url.as_deref().map(str::trim) {
            Some("") => result.add_error("pipelines.api_url", "API URL cannot be empty"),
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                result.add_error(
                    "pipelines.api_url",
                    format!("'{}' must start with http:// or https://", url),
                )
            }
            Some(_) => {}
            None => result.add_warning(
                "pipelines.api_url",
                "No pipelines API configured, pipeline routes will be unavailable",
            ),
        }

        if pipelines.max_pages == 0 {
            result.add_error("pipelines.max_pages", "Must be at least 1");
        }
        if pipelines.request_timeout_secs == 0 {
            result.add_error("pipelines.request_timeout_secs", "Must be at least 1");
        }
        if pipelines.catalog_refresh_secs == 0 {
            result.add_error("pipelines.catalog_refresh_secs", "Must be at least 1");
        }
        if pipelines.insecure {
            result.add_warning(
                "pipelines.insecure",
                "TLS certificate verification is disabled",
            );
        }

        result
    }
}

impl KfdashConfig {
    pub fn validate(&self) -> ValidationResult {
        ConfigValidator::validate(self)
    }
}

use std::sync::Arc;
use std::time::Duration;

use kfdash_api::{
    ApiError,
    ApiResult,
    ListParams,
    Page,
    Pipeline,
    PipelineRun,
    PipelineVersion,
    RecurringRun,
    RequestOptions,
};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::{
    build_api_url,
    KfpSettings,
};
use crate::types::{
    PipelineList,
    PipelineVersionList,
    RecurringRunList,
    RunList,
};

/// REST client for the pipelines v2beta1 API.
///
/// One call is one HTTP request: failures surface as-is, without retries.
pub struct KfpClient {
    http_client: Arc<reqwest::Client>,
    api_url: String,
    default_token: Option<String>,
}

impl KfpClient {
    pub fn new(
        http_client: Option<Arc<reqwest::Client>>, settings: &KfpSettings,
    ) -> ApiResult<Self> {
        let api_url = build_api_url(&settings.api_url)?;

        let http_client = match http_client {
            Some(client) => client,
            None => Arc::new(
                reqwest::Client::builder()
                    .use_rustls_tls()
                    .danger_accept_invalid_certs(settings.insecure)
                    .pool_max_idle_per_host(10)
                    .timeout(settings.request_timeout)
                    .connect_timeout(settings.connect_timeout)
                    .tcp_keepalive(Duration::from_secs(60))
                    .build()
                    .map_err(|e| {
                        ApiError::Internal(format!("Failed to build HTTP client: {}", e))
                    })?,
            ),
        };

        Ok(Self {
            http_client,
            api_url,
            default_token: settings.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn list_pipelines(
        &self, options: &RequestOptions, params: &ListParams,
    ) -> ApiResult<Page<Pipeline>> {
        let url = format!("{}/pipelines", self.api_url);
        let list: PipelineList = self.get_page(options, &url, params, true).await?;
        Ok(list.into())
    }

    pub async fn list_pipeline_versions(
        &self, options: &RequestOptions, pipeline_id: &str, params: &ListParams,
    ) -> ApiResult<Page<PipelineVersion>> {
        let url = format!(
            "{}/pipelines/{}/versions",
            self.api_url,
            urlencoding::encode(pipeline_id)
        );
        let list: PipelineVersionList = self.get_page(options, &url, params, false).await?;
        Ok(list.into())
    }

    pub async fn list_runs(
        &self, options: &RequestOptions, params: &ListParams,
    ) -> ApiResult<Page<PipelineRun>> {
        let url = format!("{}/runs", self.api_url);
        let list: RunList = self.get_page(options, &url, params, true).await?;
        Ok(list.into())
    }

    pub async fn list_recurring_runs(
        &self, options: &RequestOptions, params: &ListParams,
    ) -> ApiResult<Page<RecurringRun>> {
        let url = format!("{}/recurringruns", self.api_url);
        let list: RecurringRunList = self.get_page(options, &url, params, true).await?;
        Ok(list.into())
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self, options: &RequestOptions, url: &str, params: &ListParams, namespaced: bool,
    ) -> ApiResult<T> {
        let mut query = params.query_pairs()?;
        if namespaced {
            if let Some(namespace) = options.namespace.as_deref().filter(|ns| !ns.is_empty()) {
                query.push(("namespace", namespace.to_string()));
            }
        }

        debug!(url = %url, ?query, "Requesting page");

        let mut request = self.http_client.get(url).query(&query);
        if let Some(token) = options
            .bearer_token
            .as_deref()
            .or(self.default_token.as_deref())
        {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(format!("Failed to request {}: {}", url, e)))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self, response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();
        let url = response.url().clone();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::AuthenticationFailed(format!(
                "Authentication failed for {}: {}",
                url, error_text
            )));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format!("{} for {}", error_text, url),
            });
        }

        response.json::<T>().await.map_err(|e| {
            ApiError::SerializationError(format!(
                "Failed to parse pipelines API response from {}: {}",
                url, e
            ))
        })
    }
}

//! `PageFetcher` implementations backed by [`KfpClient`], one per listing.

use std::sync::Arc;

use async_trait::async_trait;
use kfdash_api::{
    ApiError,
    ApiResult,
    ListParams,
    Page,
    PageFetcher,
    Pipeline,
    PipelineRun,
    PipelineVersion,
    Predicate,
    RecurringRun,
    RequestOptions,
    ResourceKind,
    StorageState,
};

use crate::client::KfpClient;

pub struct PipelinesFetcher {
    client: Arc<KfpClient>,
}

impl PipelinesFetcher {
    pub fn new(client: Arc<KfpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for PipelinesFetcher {
    type Item = Pipeline;

    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Pipelines
    }

    async fn fetch_page(
        &self, options: &RequestOptions, _scope: Option<&str>, params: &ListParams,
    ) -> ApiResult<Page<Pipeline>> {
        self.client.list_pipelines(options, params).await
    }
}

/// Versions of one pipeline; the scope is the pipeline ID
pub struct PipelineVersionsFetcher {
    client: Arc<KfpClient>,
}

impl PipelineVersionsFetcher {
    pub fn new(client: Arc<KfpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for PipelineVersionsFetcher {
    type Item = PipelineVersion;

    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::PipelineVersions
    }

    fn follows_server_page_size(&self) -> bool {
        true
    }

    async fn fetch_page(
        &self, options: &RequestOptions, scope: Option<&str>, params: &ListParams,
    ) -> ApiResult<Page<PipelineVersion>> {
        let pipeline_id = scope.filter(|id| !id.is_empty()).ok_or_else(|| {
            ApiError::InvalidConfig("Pipeline versions require a pipeline ID".to_string())
        })?;
        self.client
            .list_pipeline_versions(options, pipeline_id, params)
            .await
    }
}

/// Runs, optionally restricted to one storage state (active or archived)
pub struct RunsFetcher {
    client: Arc<KfpClient>,
    storage_state: Option<StorageState>,
}

impl RunsFetcher {
    /// Every run regardless of storage state
    pub fn all(client: Arc<KfpClient>) -> Self {
        Self {
            client,
            storage_state: None,
        }
    }

    pub fn active(client: Arc<KfpClient>) -> Self {
        Self {
            client,
            storage_state: Some(StorageState::Available),
        }
    }

    pub fn archived(client: Arc<KfpClient>) -> Self {
        Self {
            client,
            storage_state: Some(StorageState::Archived),
        }
    }
}

#[async_trait]
impl PageFetcher for RunsFetcher {
    type Item = PipelineRun;

    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Runs
    }

    async fn fetch_page(
        &self, options: &RequestOptions, _scope: Option<&str>, params: &ListParams,
    ) -> ApiResult<Page<PipelineRun>> {
        match self.storage_state {
            Some(state) => {
                let scoped = params
                    .clone()
                    .with_predicate(Predicate::equals("storage_state", state.as_str()));
                self.client.list_runs(options, &scoped).await
            }
            None => self.client.list_runs(options, params).await,
        }
    }
}

pub struct RecurringRunsFetcher {
    client: Arc<KfpClient>,
}

impl RecurringRunsFetcher {
    pub fn new(client: Arc<KfpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for RecurringRunsFetcher {
    type Item = RecurringRun;

    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::RecurringRuns
    }

    async fn fetch_page(
        &self, options: &RequestOptions, _scope: Option<&str>, params: &ListParams,
    ) -> ApiResult<Page<RecurringRun>> {
        self.client.list_recurring_runs(options, params).await
    }
}

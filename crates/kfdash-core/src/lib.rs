pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod logging;

use std::sync::Arc;

pub use application::{
    Aggregator,
    CatalogRefresher,
    PipelineCatalog,
    PipelineFetchers,
    PipelineService,
    StorageClassService,
    StorageClassUpdate,
};
pub use domain::{
    ConfigField,
    DomainError,
    DomainResult,
    ParsedConfig,
    StorageClassConfigValues,
    StorageClassSummary,
};
pub use infrastructure::{
    ConfigLoadError,
    ConfigLoader,
    KfdashConfig,
};
use kfdash_kfp::{
    KfpClient,
    KfpSettings,
};

/// Services wired from configuration. A service is `None` when the backend
/// it talks to is not configured or not reachable at startup.
pub struct CoreContext {
    pub config: Arc<KfdashConfig>,

    pub pipeline_service: Option<Arc<PipelineService>>,

    pub storage_class_service: Option<Arc<StorageClassService>>,

    catalog_refresher: Option<Arc<CatalogRefresher>>,
}

impl CoreContext {
    pub async fn from_config(config: KfdashConfig) -> anyhow::Result<Self> {
        let pipeline_service = match config.pipelines.api_url.as_deref() {
            Some(api_url) => Some(Arc::new(Self::build_pipeline_service(&config, api_url)?)),
            None => {
                tracing::warn!("pipelines.api_url not set, pipeline routes are disabled");
                None
            }
        };

        let storage_class_service = match infrastructure::KubeStorageClassStore::from_kubeconfig(
            config.kubernetes.kubeconfig_path.as_deref(),
            config.kubernetes.context.as_deref(),
        )
        .await
        {
            Ok(store) => Some(Arc::new(StorageClassService::new(Arc::new(store)))),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Kubernetes unavailable, storage class routes are disabled"
                );
                None
            }
        };

        Ok(Self::from_services(
            config,
            pipeline_service,
            storage_class_service,
        ))
    }

    /// Wires already built services; the catalog refresher follows the
    /// pipeline service.
    pub fn from_services(
        config: KfdashConfig, pipeline_service: Option<Arc<PipelineService>>,
        storage_class_service: Option<Arc<StorageClassService>>,
    ) -> Self {
        let catalog_refresher = pipeline_service.as_ref().map(|service| {
            Arc::new(CatalogRefresher::new(
                Arc::clone(service),
                config.pipelines.catalog_refresh_interval(),
            ))
        });

        Self {
            config: Arc::new(config),
            pipeline_service,
            storage_class_service,
            catalog_refresher,
        }
    }

    fn build_pipeline_service(
        config: &KfdashConfig, api_url: &str,
    ) -> anyhow::Result<PipelineService> {
        let pipelines = &config.pipelines;
        let http_client = infrastructure::create_http_client(pipelines)?;

        let mut settings = KfpSettings::new(api_url);
        settings.token = pipelines.token.clone().filter(|t| !t.is_empty());
        settings.insecure = pipelines.insecure;
        settings.request_timeout = pipelines.request_timeout();
        settings.connect_timeout = pipelines.connect_timeout();

        let client = Arc::new(KfpClient::new(Some(http_client), &settings)?);
        tracing::info!(api_url = %client.api_url(), "Pipelines API configured");

        Ok(PipelineService::new(
            PipelineFetchers::from_client(client),
            Aggregator::new(pipelines.max_pages),
            Arc::new(PipelineCatalog::new()),
            pipelines.default_request_options(),
        ))
    }

    pub async fn start_background_tasks(&self) {
        if let Some(refresher) = &self.catalog_refresher {
            refresher.start().await;
        }
    }

    pub async fn shutdown(&self) {
        if let Some(refresher) = &self.catalog_refresher {
            refresher.stop().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kfdash_api::{
        Pipeline,
        PipelineRun,
        PipelineVersion,
        RecurringRun,
        RequestOptions,
        ResourceKind,
    };

    use super::*;
    use crate::application::aggregator::testing::StubFetcher;

    fn pipeline_service() -> Arc<PipelineService> {
        let fetchers = PipelineFetchers {
            pipelines: Arc::new(StubFetcher::<Pipeline>::new(ResourceKind::Pipelines)),
            versions: Arc::new(StubFetcher::<PipelineVersion>::new(
                ResourceKind::PipelineVersions,
            )),
            runs: Arc::new(StubFetcher::<PipelineRun>::new(ResourceKind::Runs)),
            active_runs: Arc::new(StubFetcher::<PipelineRun>::new(ResourceKind::Runs)),
            archived_runs: Arc::new(StubFetcher::<PipelineRun>::new(ResourceKind::Runs)),
            recurring_runs: Arc::new(StubFetcher::<RecurringRun>::new(
                ResourceKind::RecurringRuns,
            )),
        };

        Arc::new(PipelineService::new(
            fetchers,
            Aggregator::default(),
            Arc::new(PipelineCatalog::new()),
            RequestOptions::new(),
        ))
    }

    #[tokio::test]
    async fn test_background_tasks_load_catalog() {
        let service = pipeline_service();
        let core =
            CoreContext::from_services(KfdashConfig::default(), Some(Arc::clone(&service)), None);

        core.start_background_tasks().await;
        let loaded = tokio::time::timeout(Duration::from_secs(2), async {
            while !service.catalog_loaded().await {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        core.shutdown().await;

        assert!(loaded.is_ok());
    }

    /// Waits until exactly `expected` handles to the service are alive.
    /// Each running refresh loop holds one.
    async fn settles_at(service: &Arc<PipelineService>, expected: usize) -> bool {
        tokio::time::timeout(Duration::from_secs(2), async {
            while Arc::strong_count(service) != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .is_ok()
    }

    #[tokio::test]
    async fn test_refresher_restart_keeps_one_loop() {
        let service = pipeline_service();
        let refresher = CatalogRefresher::new(Arc::clone(&service), Duration::from_secs(3600));

        refresher.start().await;
        assert!(refresher.is_running().await);
        assert!(settles_at(&service, 3).await);

        refresher.stop().await;
        refresher.start().await;
        refresher.start().await;
        assert!(refresher.is_running().await);
        assert!(settles_at(&service, 3).await);

        refresher.stop().await;
        assert!(!refresher.is_running().await);
        assert!(settles_at(&service, 2).await);
    }

    #[tokio::test]
    async fn test_without_services_nothing_runs() {
        let core = CoreContext::from_services(KfdashConfig::default(), None, None);

        core.start_background_tasks().await;
        core.shutdown().await;

        assert!(core.pipeline_service.is_none());
        assert!(core.catalog_refresher.is_none());
    }
}

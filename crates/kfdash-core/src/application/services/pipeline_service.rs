use std::sync::Arc;

use kfdash_api::{
    Aggregated,
    Filter,
    ListParams,
    Page,
    PageFetcher,
    Pipeline,
    PipelineRun,
    PipelineVersion,
    RecurringRun,
    RequestOptions,
    RunFilters,
};
use kfdash_kfp::{
    KfpClient,
    PipelineVersionsFetcher,
    PipelinesFetcher,
    RecurringRunsFetcher,
    RunsFetcher,
};

use crate::application::aggregator::Aggregator;
use crate::application::catalog::PipelineCatalog;
use crate::domain::{
    DomainError,
    DomainResult,
};

/// One fetcher per listing the service exposes
#[derive(Clone)]
pub struct PipelineFetchers {
    pub pipelines: Arc<dyn PageFetcher<Item = Pipeline>>,
    pub versions: Arc<dyn PageFetcher<Item = PipelineVersion>>,
    pub runs: Arc<dyn PageFetcher<Item = PipelineRun>>,
    pub active_runs: Arc<dyn PageFetcher<Item = PipelineRun>>,
    pub archived_runs: Arc<dyn PageFetcher<Item = PipelineRun>>,
    pub recurring_runs: Arc<dyn PageFetcher<Item = RecurringRun>>,
}

impl PipelineFetchers {
    pub fn from_client(client: Arc<KfpClient>) -> Self {
        Self {
            pipelines: Arc::new(PipelinesFetcher::new(Arc::clone(&client))),
            versions: Arc::new(PipelineVersionsFetcher::new(Arc::clone(&client))),
            runs: Arc::new(RunsFetcher::all(Arc::clone(&client))),
            active_runs: Arc::new(RunsFetcher::active(Arc::clone(&client))),
            archived_runs: Arc::new(RunsFetcher::archived(Arc::clone(&client))),
            recurring_runs: Arc::new(RecurringRunsFetcher::new(client)),
        }
    }
}

pub struct PipelineService {
    fetchers: PipelineFetchers,
    aggregator: Aggregator,
    catalog: Arc<PipelineCatalog>,
    catalog_options: RequestOptions,
}

impl PipelineService {
    /// `catalog_options` are the request options background catalog
    /// refreshes run with.
    pub fn new(
        fetchers: PipelineFetchers, aggregator: Aggregator, catalog: Arc<PipelineCatalog>,
        catalog_options: RequestOptions,
    ) -> Self {
        Self {
            fetchers,
            aggregator,
            catalog,
            catalog_options,
        }
    }

    pub fn catalog(&self) -> &Arc<PipelineCatalog> {
        &self.catalog
    }

    /// Lists every pipeline. An unfiltered listing also refreshes the
    /// catalog of the namespace it ran in.
    pub async fn all_pipelines(
        &self, options: &RequestOptions, params: ListParams,
    ) -> DomainResult<Aggregated<Pipeline>> {
        let unfiltered = params.filter.is_none();
        let items = self
            .aggregator
            .aggregate_all(self.fetchers.pipelines.as_ref(), options, None, params)
            .await?;

        if unfiltered {
            let ids = items.iter().map(|p| p.pipeline_id.clone()).collect();
            self.catalog.replace(options.namespace.as_deref(), ids).await;
        }
        Ok(Aggregated::from_items(items))
    }

    pub async fn pipelines_page(
        &self, options: &RequestOptions, params: &ListParams,
    ) -> DomainResult<Page<Pipeline>> {
        Ok(self.fetchers.pipelines.fetch_page(options, None, params).await?)
    }

    /// Whether a pipeline with exactly this display name already exists
    pub async fn pipeline_name_taken(
        &self, options: &RequestOptions, name: &str,
    ) -> DomainResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        let params = ListParams::new()
            .with_page_size(1)
            .with_filter(Filter::name_equals(name));
        let page = self.pipelines_page(options, &params).await?;

        Ok(!page.items.is_empty())
    }

    /// Reloads the catalog of the configured namespace, returning how many
    /// pipelines it holds
    pub async fn refresh_catalog(&self) -> DomainResult<usize> {
        let pipelines = self
            .all_pipelines(&self.catalog_options, ListParams::new())
            .await?;
        Ok(pipelines.total_count)
    }

    /// Whether the configured namespace has been catalogued
    pub async fn catalog_loaded(&self) -> bool {
        self.catalog
            .is_loaded(self.catalog_options.namespace.as_deref())
            .await
    }

    /// Every version of every pipeline catalogued for the request's
    /// namespace, grouped in catalog order
    pub async fn all_pipeline_versions(
        &self, options: &RequestOptions, params: ListParams,
    ) -> DomainResult<Aggregated<PipelineVersion>> {
        let namespace = options.namespace.as_deref();
        let Some(pipeline_ids) = self.catalog.snapshot(namespace).await else {
            return Err(DomainError::NotReady("Pipelines not loaded".to_string()));
        };

        tracing::debug!(
            pipelines = pipeline_ids.len(),
            namespace = namespace.unwrap_or_default(),
            "Fetching versions across pipelines"
        );

        self.aggregator
            .aggregate_across_scopes(
                self.fetchers.versions.as_ref(),
                options,
                &pipeline_ids,
                &params,
            )
            .await
    }

    pub async fn all_versions_by_pipeline(
        &self, options: &RequestOptions, pipeline_id: &str, params: ListParams,
    ) -> DomainResult<Aggregated<PipelineVersion>> {
        let pipeline_id = require_pipeline_id(pipeline_id)?;
        let items = self
            .aggregator
            .aggregate_all(
                self.fetchers.versions.as_ref(),
                options,
                Some(pipeline_id),
                params,
            )
            .await?;
        Ok(Aggregated::from_items(items))
    }

    pub async fn pipeline_versions_page(
        &self, options: &RequestOptions, pipeline_id: &str, params: &ListParams,
    ) -> DomainResult<Page<PipelineVersion>> {
        let pipeline_id = require_pipeline_id(pipeline_id)?;
        Ok(self
            .fetchers
            .versions
            .fetch_page(options, Some(pipeline_id), params)
            .await?)
    }

    pub async fn all_active_runs(
        &self, options: &RequestOptions, filters: &RunFilters, params: ListParams,
    ) -> DomainResult<Aggregated<PipelineRun>> {
        let params = params.merge_run_filters(filters);
        let items = self
            .aggregator
            .aggregate_all(self.fetchers.active_runs.as_ref(), options, None, params)
            .await?;
        Ok(Aggregated::from_items(items))
    }

    pub async fn active_runs_page(
        &self, options: &RequestOptions, filters: &RunFilters, params: ListParams,
    ) -> DomainResult<Page<PipelineRun>> {
        let params = params.merge_run_filters(filters);
        Ok(self
            .fetchers
            .active_runs
            .fetch_page(options, None, &params)
            .await?)
    }

    pub async fn archived_runs_page(
        &self, options: &RequestOptions, filters: &RunFilters, params: ListParams,
    ) -> DomainResult<Page<PipelineRun>> {
        let params = params.merge_run_filters(filters);
        Ok(self
            .fetchers
            .archived_runs
            .fetch_page(options, None, &params)
            .await?)
    }

    /// Runs of one experiment regardless of storage state
    pub async fn runs_by_experiment_page(
        &self, options: &RequestOptions, experiment_id: &str, params: ListParams,
    ) -> DomainResult<Page<PipelineRun>> {
        let params = params.merge_run_filters(&RunFilters::for_experiment(experiment_id));
        Ok(self.fetchers.runs.fetch_page(options, None, &params).await?)
    }

    pub async fn all_recurring_runs(
        &self, options: &RequestOptions, filters: &RunFilters, params: ListParams,
    ) -> DomainResult<Aggregated<RecurringRun>> {
        let params = params.merge_run_filters(filters);
        let items = self
            .aggregator
            .aggregate_all(self.fetchers.recurring_runs.as_ref(), options, None, params)
            .await?;
        Ok(Aggregated::from_items(items))
    }

    pub async fn recurring_runs_page(
        &self, options: &RequestOptions, filters: &RunFilters, params: ListParams,
    ) -> DomainResult<Page<RecurringRun>> {
        let params = params.merge_run_filters(filters);
        Ok(self
            .fetchers
            .recurring_runs
            .fetch_page(options, None, &params)
            .await?)
    }
}

fn require_pipeline_id(pipeline_id: &str) -> DomainResult<&str> {
    if pipeline_id.is_empty() {
        Err(DomainError::NotReady("No pipeline ID.".to_string()))
    } else {
        Ok(pipeline_id)
    }
}

#[cfg(test)]
mod tests {
    use kfdash_api::{
        ApiError,
        ResourceKind,
    };

    use super::*;
    use crate::application::aggregator::testing::StubFetcher;

    fn pipeline(id: &str) -> Pipeline {
        Pipeline {
            pipeline_id: id.to_string(),
            display_name: format!("Pipeline {}", id),
            description: None,
            namespace: None,
            created_at: None,
        }
    }

    fn version(pipeline_id: &str, id: &str) -> PipelineVersion {
        PipelineVersion {
            pipeline_id: pipeline_id.to_string(),
            pipeline_version_id: id.to_string(),
            display_name: id.to_string(),
            description: None,
            code_source_url: None,
            created_at: None,
        }
    }

    fn run(id: &str) -> PipelineRun {
        serde_json::from_value(serde_json::json!({
            "run_id": id,
            "display_name": id,
        }))
        .unwrap()
    }

    fn recurring_run(id: &str) -> RecurringRun {
        serde_json::from_value(serde_json::json!({
            "recurring_run_id": id,
            "display_name": id,
        }))
        .unwrap()
    }

    struct Stubs {
        pipelines: Arc<StubFetcher<Pipeline>>,
        versions: Arc<StubFetcher<PipelineVersion>>,
        runs: Arc<StubFetcher<PipelineRun>>,
        active_runs: Arc<StubFetcher<PipelineRun>>,
        archived_runs: Arc<StubFetcher<PipelineRun>>,
        recurring_runs: Arc<StubFetcher<RecurringRun>>,
    }

    impl Default for Stubs {
        fn default() -> Self {
            Self {
                pipelines: Arc::new(StubFetcher::new(ResourceKind::Pipelines)),
                versions: Arc::new(StubFetcher::new(ResourceKind::PipelineVersions)),
                runs: Arc::new(StubFetcher::new(ResourceKind::Runs)),
                active_runs: Arc::new(StubFetcher::new(ResourceKind::Runs)),
                archived_runs: Arc::new(StubFetcher::new(ResourceKind::Runs)),
                recurring_runs: Arc::new(StubFetcher::new(ResourceKind::RecurringRuns)),
            }
        }
    }

    impl Stubs {
        fn service(&self, catalog: PipelineCatalog) -> PipelineService {
            let fetchers = PipelineFetchers {
                pipelines: self.pipelines.clone(),
                versions: self.versions.clone(),
                runs: self.runs.clone(),
                active_runs: self.active_runs.clone(),
                archived_runs: self.archived_runs.clone(),
                recurring_runs: self.recurring_runs.clone(),
            };
            PipelineService::new(
                fetchers,
                Aggregator::default(),
                Arc::new(catalog),
                RequestOptions::new().with_namespace("ds-project"),
            )
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_all_pipelines_follows_tokens() {
        let stubs = Stubs {
            pipelines: Arc::new(
                StubFetcher::new(ResourceKind::Pipelines)
                    .page(None, None, vec![pipeline("a"), pipeline("b")], Some("t1"))
                    .page(None, Some("t1"), vec![pipeline("c")], None),
            ),
            ..Default::default()
        };

        let result = stubs
            .service(PipelineCatalog::new())
            .all_pipelines(&RequestOptions::new(), ListParams::new())
            .await
            .unwrap();

        assert_eq!(result.total_count, 3);
        assert_eq!(result.items[2].pipeline_id, "c");
    }

    #[tokio::test]
    async fn test_fan_out_requires_loaded_catalog() {
        let stubs = Stubs::default();

        let err = stubs
            .service(PipelineCatalog::new())
            .all_pipeline_versions(&RequestOptions::new(), ListParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotReady(ref msg) if msg == "Pipelines not loaded"));
        assert_eq!(stubs.versions.call_count(), 0);
        assert_eq!(stubs.pipelines.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fan_out_groups_versions_in_catalog_order() {
        let stubs = Stubs {
            versions: Arc::new(
                StubFetcher::new(ResourceKind::PipelineVersions)
                    .page(Some("p2"), None, vec![version("p2", "v3")], None)
                    .page(
                        Some("p1"),
                        None,
                        vec![version("p1", "v1")],
                        Some("next"),
                    )
                    .page(Some("p1"), Some("next"), vec![version("p1", "v2")], None),
            ),
            ..Default::default()
        };

        let result = stubs
            .service(PipelineCatalog::loaded(None, ids(&["p1", "p2"])))
            .all_pipeline_versions(&RequestOptions::new(), ListParams::new())
            .await
            .unwrap();

        let version_ids: Vec<&str> = result
            .items
            .iter()
            .map(|v| v.pipeline_version_id.as_str())
            .collect();
        assert_eq!(version_ids, vec!["v1", "v2", "v3"]);
        assert_eq!(result.total_count, 3);
    }

    #[tokio::test]
    async fn test_fan_out_fails_when_one_pipeline_fails() {
        let stubs = Stubs {
            versions: Arc::new(
                StubFetcher::new(ResourceKind::PipelineVersions)
                    .page(Some("p1"), None, vec![version("p1", "v1")], None)
                    .failing(Some("p2"), None, ApiError::NotFound("p2".to_string())),
            ),
            ..Default::default()
        };

        let result = stubs
            .service(PipelineCatalog::loaded(None, ids(&["p1", "p2"])))
            .all_pipeline_versions(&RequestOptions::new(), ListParams::new())
            .await;

        assert!(matches!(result, Err(DomainError::Api(ApiError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_fan_out_uses_the_request_namespace() {
        let stubs = Stubs {
            versions: Arc::new(
                StubFetcher::new(ResourceKind::PipelineVersions).page(
                    Some("a-pipe"),
                    None,
                    vec![version("a-pipe", "a-v1")],
                    None,
                ),
            ),
            ..Default::default()
        };
        let service = stubs.service(PipelineCatalog::loaded(Some("team-a"), ids(&["a-pipe"])));

        let err = service
            .all_pipeline_versions(
                &RequestOptions::new().with_namespace("team-b"),
                ListParams::new(),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_ready());
        assert_eq!(stubs.versions.call_count(), 0);

        let result = service
            .all_pipeline_versions(
                &RequestOptions::new().with_namespace("team-a"),
                ListParams::new(),
            )
            .await
            .unwrap();
        assert_eq!(result.items[0].pipeline_version_id, "a-v1");
    }

    #[tokio::test]
    async fn test_listing_pipelines_catalogs_their_namespace() {
        let stubs = Stubs {
            pipelines: Arc::new(
                StubFetcher::new(ResourceKind::Pipelines)
                    .page(None, None, vec![pipeline("b-pipe")], None),
            ),
            versions: Arc::new(
                StubFetcher::new(ResourceKind::PipelineVersions).page(
                    Some("b-pipe"),
                    None,
                    vec![version("b-pipe", "b-v1")],
                    None,
                ),
            ),
            ..Default::default()
        };
        let service = stubs.service(PipelineCatalog::new());
        let team_b = RequestOptions::new().with_namespace("team-b");

        service
            .all_pipelines(
                &team_b,
                ListParams::new().with_filter(Filter::name_equals("b-pipe")),
            )
            .await
            .unwrap();
        assert!(!service.catalog().is_loaded(Some("team-b")).await);

        service
            .all_pipelines(&team_b, ListParams::new())
            .await
            .unwrap();
        let result = service
            .all_pipeline_versions(&team_b, ListParams::new())
            .await
            .unwrap();

        assert_eq!(result.total_count, 1);
        assert!(!service.catalog_loaded().await);
    }

    #[tokio::test]
    async fn test_empty_pipeline_id_is_not_ready() {
        let stubs = Stubs::default();
        let service = stubs.service(PipelineCatalog::new());

        let err = service
            .all_versions_by_pipeline(&RequestOptions::new(), "", ListParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotReady(ref msg) if msg == "No pipeline ID."));

        let err = service
            .pipeline_versions_page(&RequestOptions::new(), "", &ListParams::new())
            .await
            .unwrap_err();
        assert!(err.is_not_ready());
        assert_eq!(stubs.versions.call_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_catalog_loads_pipeline_ids() {
        let stubs = Stubs {
            pipelines: Arc::new(
                StubFetcher::new(ResourceKind::Pipelines)
                    .page(None, None, vec![pipeline("a")], Some("t1"))
                    .page(None, Some("t1"), vec![pipeline("b")], None),
            ),
            ..Default::default()
        };
        let service = stubs.service(PipelineCatalog::new());

        let count = service.refresh_catalog().await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            service.catalog().snapshot(Some("ds-project")).await,
            Some(ids(&["a", "b"]))
        );
        assert!(service.catalog_loaded().await);
        assert!(!service.catalog().is_loaded(None).await);
    }

    #[tokio::test]
    async fn test_active_runs_omit_undefined_filters() {
        let stubs = Stubs {
            active_runs: Arc::new(
                StubFetcher::new(ResourceKind::Runs).page(None, None, vec![run("r1")], None),
            ),
            ..Default::default()
        };

        let filters = RunFilters {
            experiment_id: None,
            pipeline_version_id: Some(String::new()),
        };
        let result = stubs
            .service(PipelineCatalog::new())
            .all_active_runs(&RequestOptions::new(), &filters, ListParams::new())
            .await
            .unwrap();

        assert_eq!(result.total_count, 1);
        let params = stubs.active_runs.last_params().unwrap();
        assert!(params.experiment_id.is_none());
        assert!(params.pipeline_version_id.is_none());
        assert!(params
            .query_pairs()
            .unwrap()
            .iter()
            .all(|(key, _)| *key != "experiment_id" && *key != "filter"));
    }

    #[tokio::test]
    async fn test_runs_by_experiment_page_sets_experiment() {
        let stubs = Stubs {
            runs: Arc::new(
                StubFetcher::new(ResourceKind::Runs).page(
                    None,
                    None,
                    vec![run("r1"), run("r2")],
                    Some("more"),
                ),
            ),
            ..Default::default()
        };

        let page = stubs
            .service(PipelineCatalog::new())
            .runs_by_experiment_page(
                &RequestOptions::new(),
                "exp-1",
                ListParams::new().with_page_size(2),
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("more"));
        assert_eq!(stubs.runs.call_count(), 1);
        assert_eq!(
            stubs.runs.last_params().unwrap().experiment_id.as_deref(),
            Some("exp-1")
        );
    }

    #[tokio::test]
    async fn test_archived_runs_page_uses_archived_fetcher() {
        let stubs = Stubs {
            archived_runs: Arc::new(
                StubFetcher::new(ResourceKind::Runs).page(None, None, vec![run("old")], None),
            ),
            ..Default::default()
        };

        let page = stubs
            .service(PipelineCatalog::new())
            .archived_runs_page(
                &RequestOptions::new(),
                &RunFilters::default(),
                ListParams::new(),
            )
            .await
            .unwrap();

        assert_eq!(page.items[0].run_id, "old");
        assert_eq!(stubs.active_runs.call_count(), 0);
    }

    #[tokio::test]
    async fn test_all_recurring_runs_merges_filters() {
        let stubs = Stubs {
            recurring_runs: Arc::new(
                StubFetcher::new(ResourceKind::RecurringRuns)
                    .page(None, None, vec![recurring_run("s1")], Some("t"))
                    .page(None, Some("t"), vec![recurring_run("s2")], None),
            ),
            ..Default::default()
        };

        let result = stubs
            .service(PipelineCatalog::new())
            .all_recurring_runs(
                &RequestOptions::new(),
                &RunFilters::for_experiment("exp-9"),
                ListParams::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.total_count, 2);
        let params = stubs.recurring_runs.last_params().unwrap();
        assert_eq!(params.experiment_id.as_deref(), Some("exp-9"));
        assert_eq!(params.page_token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_pipeline_name_taken() {
        let stubs = Stubs {
            pipelines: Arc::new(
                StubFetcher::new(ResourceKind::Pipelines)
                    .page(None, None, vec![pipeline("a")], None),
            ),
            ..Default::default()
        };
        let service = stubs.service(PipelineCatalog::new());

        assert!(service
            .pipeline_name_taken(&RequestOptions::new(), "Pipeline a")
            .await
            .unwrap());
        let params = stubs.pipelines.last_params().unwrap();
        assert_eq!(params.filter, Some(Filter::name_equals("Pipeline a")));
        assert_eq!(params.page_size, Some(1));

        assert!(!service
            .pipeline_name_taken(&RequestOptions::new(), "   ")
            .await
            .unwrap());
        assert_eq!(stubs.pipelines.call_count(), 1);
    }
}

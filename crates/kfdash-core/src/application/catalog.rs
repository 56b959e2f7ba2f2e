use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{
    Mutex,
    RwLock,
};
use tokio::task::JoinHandle;
use tokio::time::interval;

use super::services::pipeline_service::PipelineService;

/// Pipeline IDs the cross-pipeline listings fan out over, per namespace.
///
/// A namespace stays unloaded until its pipelines have been listed in full
/// so callers can tell "no pipelines" apart from "not fetched yet".
#[derive(Debug, Default)]
pub struct PipelineCatalog {
    pipeline_ids: RwLock<HashMap<Option<String>, Vec<String>>>,
}

impl PipelineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn loaded(namespace: Option<&str>, pipeline_ids: Vec<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(namespace.map(str::to_string), pipeline_ids);
        Self {
            pipeline_ids: RwLock::new(entries),
        }
    }

    pub async fn snapshot(&self, namespace: Option<&str>) -> Option<Vec<String>> {
        self.pipeline_ids
            .read()
            .await
            .get(&namespace.map(str::to_string))
            .cloned()
    }

    pub async fn replace(&self, namespace: Option<&str>, pipeline_ids: Vec<String>) {
        self.pipeline_ids
            .write()
            .await
            .insert(namespace.map(str::to_string), pipeline_ids);
    }

    pub async fn is_loaded(&self, namespace: Option<&str>) -> bool {
        self.pipeline_ids
            .read()
            .await
            .contains_key(&namespace.map(str::to_string))
    }
}

/// Keeps the catalog warm by re-listing pipelines on a fixed interval
pub struct CatalogRefresher {
    pipeline_service: Arc<PipelineService>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CatalogRefresher {
    pub fn new(pipeline_service: Arc<PipelineService>, period: Duration) -> Self {
        Self {
            pipeline_service,
            period,
            task: Mutex::new(None),
        }
    }

    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let pipeline_service = Arc::clone(&self.pipeline_service);
        let period = self.period;

        *task = Some(tokio::spawn(async move {
            // first tick fires immediately, loading the catalog at startup
            let mut tick_interval = interval(period);

            tracing::info!(period_secs = period.as_secs(), "CatalogRefresher started");

            loop {
                tick_interval.tick().await;

                match pipeline_service.refresh_catalog().await {
                    Ok(count) => {
                        tracing::debug!(pipelines = count, "Pipeline catalog refreshed");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Pipeline catalog refresh failed");
                    }
                }
            }
        }));
    }

    /// Aborts the refresh loop; a refresh in flight is dropped
    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            tracing::info!("CatalogRefresher stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

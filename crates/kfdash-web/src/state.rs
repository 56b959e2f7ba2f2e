use std::sync::Arc;

use kfdash_core::{
    CoreContext,
    PipelineService,
    StorageClassService,
};

use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<CoreContext>,
}

impl AppState {
    pub fn new(core: Arc<CoreContext>) -> Self {
        Self { core }
    }

    pub fn pipelines(&self) -> Result<&Arc<PipelineService>, AppError> {
        self.core
            .pipeline_service
            .as_ref()
            .ok_or_else(|| AppError::not_configured("Pipelines API is not configured"))
    }

    pub fn storage_classes(&self) -> Result<&Arc<StorageClassService>, AppError> {
        self.core
            .storage_class_service
            .as_ref()
            .ok_or_else(|| AppError::not_configured("Kubernetes access is not configured"))
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.core
            .config
            .pipelines
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
    }
}

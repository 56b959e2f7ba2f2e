pub mod services;

pub use services::pipeline_service::{
    PipelineFetchers,
    PipelineService,
};
pub use services::storage_class_service::{
    StorageClassService,
    StorageClassUpdate,
};

pub mod aggregator;
pub use aggregator::{
    Aggregator,
    DEFAULT_MAX_PAGES,
};

mod catalog;
pub use catalog::{
    CatalogRefresher,
    PipelineCatalog,
};

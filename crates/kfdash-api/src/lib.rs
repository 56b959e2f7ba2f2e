pub mod error;
pub mod fetcher;
pub mod page;
pub mod params;
pub mod types;

pub use error::{
    ApiError,
    ApiResult,
};
pub use fetcher::PageFetcher;
pub use page::{
    Aggregated,
    Page,
    RequestOptions,
    ResourceKind,
};
pub use params::{
    Filter,
    ListParams,
    Predicate,
    PredicateOperation,
    PredicateValue,
    RunFilters,
    SortDirection,
    SortOrder,
};
pub use types::{
    Pipeline,
    PipelineRun,
    PipelineVersion,
    PipelineVersionReference,
    RecurringRun,
    RecurringRunMode,
    RecurringRunStatus,
    RuntimeState,
    StorageState,
};

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::page::{
    Page,
    RequestOptions,
    ResourceKind,
};
use crate::params::ListParams;

/// Fetches one page of a collection - every resource kind implements this
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Item: Send;

    /// Kind of resource this fetcher lists
    fn resource_kind(&self) -> ResourceKind;

    /// Whether follow-up requests should ask for the length of the page
    /// just received instead of the caller's original page size
    fn follows_server_page_size(&self) -> bool {
        false
    }

    /// Fetch a single page. `scope` names the parent resource for nested
    /// collections and is `None` for flat listings. Errors are returned as
    /// the transport produced them.
    async fn fetch_page(
        &self, options: &RequestOptions, scope: Option<&str>, params: &ListParams,
    ) -> ApiResult<Page<Self::Item>>;
}

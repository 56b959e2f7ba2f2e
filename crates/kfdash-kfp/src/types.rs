//! List envelopes as returned by the v2beta1 REST API. Every envelope may
//! omit its item array, and the continuation token shows up as either
//! `next_page_token` or `nextPageToken` depending on the server build.

use kfdash_api::{
    Page,
    Pipeline,
    PipelineRun,
    PipelineVersion,
    RecurringRun,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineList {
    #[serde(default)]
    pub pipelines: Option<Vec<Pipeline>>,
    #[serde(default)]
    pub total_size: Option<usize>,
    #[serde(default, alias = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineVersionList {
    #[serde(default)]
    pub pipeline_versions: Option<Vec<PipelineVersion>>,
    #[serde(default)]
    pub total_size: Option<usize>,
    #[serde(default, alias = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunList {
    #[serde(default)]
    pub runs: Option<Vec<PipelineRun>>,
    #[serde(default)]
    pub total_size: Option<usize>,
    #[serde(default, alias = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurringRunList {
    #[serde(default, rename = "recurringRuns")]
    pub recurring_runs: Option<Vec<RecurringRun>>,
    #[serde(default)]
    pub total_size: Option<usize>,
    #[serde(default, alias = "nextPageToken")]
    pub next_page_token: Option<String>,
}

macro_rules! impl_into_page {
    ($list:ty, $field:ident, $item:ty) => {
        impl From<$list> for Page<$item> {
            fn from(list: $list) -> Self {
                Page {
                    items: list.$field.unwrap_or_default(),
                    next_page_token: list.next_page_token,
                    total_size: list.total_size,
                }
            }
        }
    };
}

impl_into_page!(PipelineList, pipelines, Pipeline);
impl_into_page!(PipelineVersionList, pipeline_versions, PipelineVersion);
impl_into_page!(RunList, runs, PipelineRun);
impl_into_page!(RecurringRunList, recurring_runs, RecurringRun);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_items_become_empty_page() {
        let list: RunList = serde_json::from_str("{}").unwrap();
        let page: Page<PipelineRun> = list.into();

        assert!(page.items.is_empty());
        assert!(page.continuation().is_none());
    }

    #[test]
    fn test_camel_case_token_accepted() {
        let list: RecurringRunList = serde_json::from_value(serde_json::json!({
            "recurringRuns": [
                { "recurring_run_id": "rr-1", "display_name": "daily" }
            ],
            "nextPageToken": "tok"
        }))
        .unwrap();
        let page: Page<RecurringRun> = list.into();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.continuation(), Some("tok"));
    }

    #[test]
    fn test_version_envelope() {
        let list: PipelineVersionList = serde_json::from_value(serde_json::json!({
            "pipeline_versions": [
                {
                    "pipeline_id": "p-1",
                    "pipeline_version_id": "v-1",
                    "display_name": "v1",
                    "created_at": "2024-09-09T17:45:05Z"
                }
            ],
            "total_size": 7,
            "next_page_token": "next"
        }))
        .unwrap();
        let page: Page<PipelineVersion> = list.into();

        assert_eq!(page.items[0].pipeline_version_id, "v-1");
        assert_eq!(page.total_size, Some(7));
        assert_eq!(page.next_page_token.as_deref(), Some("next"));
    }
}

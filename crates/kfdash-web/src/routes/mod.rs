pub mod health;
mod pipelines;
mod recurring_runs;
mod runs;
mod storage_classes;

use axum::{
    http::{
        header::AUTHORIZATION,
        HeaderMap,
    },
    routing::get,
    Router,
};
use kfdash_api::{
    ListParams,
    RequestOptions,
    RunFilters,
    SortDirection,
    SortOrder,
};
use serde::Deserialize;

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/pipelines", pipelines::router())
        .nest("/runs", runs::router())
        .route(
            "/experiments/{id}/runs",
            get(runs::list_experiment_runs),
        )
        .nest("/recurring-runs", recurring_runs::router())
        .nest("/storage-classes", storage_classes::router())
}

/// Query string shared by every listing route
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page_token: Option<String>,
    pub page_size: Option<usize>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub experiment_id: Option<String>,
    pub pipeline_version_id: Option<String>,
    pub namespace: Option<String>,
}

impl ListQuery {
    pub fn list_params(&self) -> ListParams {
        let sort = self
            .sort_field
            .as_deref()
            .filter(|field| !field.is_empty())
            .map(|field| SortOrder {
                field: field.to_string(),
                direction: self.sort_direction.unwrap_or(SortDirection::Asc),
            });

        ListParams {
            page_token: self.page_token.clone().filter(|t| !t.is_empty()),
            page_size: self.page_size.filter(|size| *size > 0),
            sort,
            ..Default::default()
        }
    }

    pub fn run_filters(&self) -> RunFilters {
        RunFilters {
            experiment_id: self.experiment_id.clone(),
            pipeline_version_id: self.pipeline_version_id.clone(),
        }
    }

    /// Namespace from the query, else the configured one. The bearer token
    /// is taken from the incoming `Authorization` header when present.
    pub fn request_options(&self, state: &AppState, headers: &HeaderMap) -> RequestOptions {
        let mut options = RequestOptions::new();

        let namespace = self
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .or_else(|| state.default_namespace());
        if let Some(namespace) = namespace {
            options = options.with_namespace(namespace);
        }
        if let Some(token) = bearer_token(headers) {
            options = options.with_bearer_token(token);
        }

        options
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

use axum::{
    extract::{
        Path,
        Query,
        State,
    },
    http::HeaderMap,
    routing::get,
    Json,
    Router,
};
use kfdash_api::{
    Aggregated,
    Page,
    Pipeline,
    PipelineVersion,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::ListQuery;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NameTakenQuery {
    #[serde(default)]
    pub name: String,
    pub namespace: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NameTakenResponse {
    pub taken: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pipelines))
        .route("/all", get(list_all_pipelines))
        .route("/name-taken", get(pipeline_name_taken))
        .route("/versions/all", get(list_all_versions))
        .route("/{id}/versions", get(list_pipeline_versions))
        .route("/{id}/versions/all", get(list_all_pipeline_versions))
}

async fn list_pipelines(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<Pipeline>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let page = service
        .pipelines_page(&options, &query.list_params())
        .await?;

    Ok(Json(page))
}

async fn list_all_pipelines(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Aggregated<Pipeline>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let pipelines = service
        .all_pipelines(&options, query.list_params())
        .await?;

    Ok(Json(pipelines))
}

async fn pipeline_name_taken(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<NameTakenQuery>,
) -> ApiResult<Json<NameTakenResponse>> {
    let service = state.pipelines()?;
    let list_query = ListQuery {
        namespace: query.namespace,
        ..Default::default()
    };
    let options = list_query.request_options(&state, &headers);
    let taken = service.pipeline_name_taken(&options, &query.name).await?;

    Ok(Json(NameTakenResponse { taken }))
}

/// Versions of every pipeline catalogued for the requested namespace
async fn list_all_versions(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Aggregated<PipelineVersion>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let versions = service
        .all_pipeline_versions(&options, query.list_params())
        .await?;

    tracing::debug!(
        count = versions.total_count,
        "Listed versions across pipelines"
    );
    Ok(Json(versions))
}

async fn list_pipeline_versions(
    State(state): State<AppState>, headers: HeaderMap, Path(pipeline_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<PipelineVersion>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let page = service
        .pipeline_versions_page(&options, &pipeline_id, &query.list_params())
        .await?;

    Ok(Json(page))
}

async fn list_all_pipeline_versions(
    State(state): State<AppState>, headers: HeaderMap, Path(pipeline_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Aggregated<PipelineVersion>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let versions = service
        .all_versions_by_pipeline(&options, &pipeline_id, query.list_params())
        .await?;

    Ok(Json(versions))
}

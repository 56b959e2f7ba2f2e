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
    PipelineRun,
};

use super::ListQuery;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/active", get(list_active_runs))
        .route("/active/all", get(list_all_active_runs))
        .route("/archived", get(list_archived_runs))
}

async fn list_active_runs(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<PipelineRun>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let page = service
        .active_runs_page(&options, &query.run_filters(), query.list_params())
        .await?;

    Ok(Json(page))
}

async fn list_all_active_runs(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Aggregated<PipelineRun>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let runs = service
        .all_active_runs(&options, &query.run_filters(), query.list_params())
        .await?;

    Ok(Json(runs))
}

async fn list_archived_runs(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<PipelineRun>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let page = service
        .archived_runs_page(&options, &query.run_filters(), query.list_params())
        .await?;

    Ok(Json(page))
}

pub(super) async fn list_experiment_runs(
    State(state): State<AppState>, headers: HeaderMap, Path(experiment_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<PipelineRun>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let page = service
        .runs_by_experiment_page(&options, &experiment_id, query.list_params())
        .await?;

    Ok(Json(page))
}

use axum::{
    extract::{
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
    RecurringRun,
};

use super::ListQuery;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recurring_runs))
        .route("/all", get(list_all_recurring_runs))
}

async fn list_recurring_runs(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<RecurringRun>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let page = service
        .recurring_runs_page(&options, &query.run_filters(), query.list_params())
        .await?;

    Ok(Json(page))
}

async fn list_all_recurring_runs(
    State(state): State<AppState>, headers: HeaderMap, Query(query): Query<ListQuery>,
) -> ApiResult<Json<Aggregated<RecurringRun>>> {
    let service = state.pipelines()?;
    let options = query.request_options(&state, &headers);
    let runs = service
        .all_recurring_runs(&options, &query.run_filters(), query.list_params())
        .await?;

    Ok(Json(runs))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::testing::{
        app,
        get_json,
        Backend,
    };

    #[tokio::test]
    async fn test_all_recurring_runs() {
        let backend = Backend::new(Vec::new(), Vec::new());

        let (status, body) = get_json(
            app(Some(backend.service.clone())),
            "/api/v1/recurring-runs/all?experiment_id=exp-2",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], serde_json::json!([]));
        let (_, _, params) = backend.recurring_runs.last_call();
        assert_eq!(params.experiment_id.as_deref(), Some("exp-2"));
    }
}

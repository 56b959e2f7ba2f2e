use axum::{
    extract::{
        Path,
        State,
    },
    routing::{
        get,
        patch,
        post,
    },
    Json,
    Router,
};
use kfdash_core::{
    ConfigField,
    ParsedConfig,
    StorageClassConfigValues,
    StorageClassSummary,
    StorageClassUpdate,
};

use crate::error::{
    ApiResult,
    AppError,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_storage_classes))
        .route("/{name}", patch(update_storage_class))
        .route("/{name}/reset/{field}", post(reset_config_field))
        .route("/{name}/default", post(set_default_storage_class))
}

async fn list_storage_classes(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<StorageClassSummary>>> {
    let service = state.storage_classes()?;
    Ok(Json(service.list().await?))
}

async fn update_storage_class(
    State(state): State<AppState>, Path(name): Path<String>,
    Json(update): Json<StorageClassUpdate>,
) -> ApiResult<Json<StorageClassConfigValues>> {
    let service = state.storage_classes()?;
    Ok(Json(service.update(&name, update).await?))
}

async fn reset_config_field(
    State(state): State<AppState>, Path((name, field)): Path<(String, String)>,
) -> ApiResult<Json<ParsedConfig>> {
    let service = state.storage_classes()?;
    let field: ConfigField = field.parse().map_err(AppError::bad_request)?;

    Ok(Json(service.reset_field(&name, field).await?))
}

async fn set_default_storage_class(
    State(state): State<AppState>, Path(name): Path<String>,
) -> ApiResult<Json<StorageClassConfigValues>> {
    let service = state.storage_classes()?;
    Ok(Json(service.set_default(&name).await?))
}

use axum::{
    extract::State,
    Json,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub pipelines: PipelinesHealth,
    pub storage_classes: StorageClassesHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PipelinesHealth {
    pub configured: bool,
    pub catalog_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageClassesHealth {
    pub configured: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pipelines = match state.core.pipeline_service.as_ref() {
        Some(service) => PipelinesHealth {
            configured: true,
            catalog_loaded: service.catalog_loaded().await,
        },
        None => PipelinesHealth {
            configured: false,
            catalog_loaded: false,
        },
    };

    let status = if pipelines.configured && !pipelines.catalog_loaded {
        "initializing"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pipelines,
        storage_classes: StorageClassesHealth {
            configured: state.core.storage_class_service.is_some(),
        },
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::testing::{
        app,
        get_json,
    };

    #[tokio::test]
    async fn test_health_without_backends() {
        let (status, body) = get_json(app(None), "/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["pipelines"]["configured"], false);
        assert_eq!(body["storage_classes"]["configured"], false);
    }
}

// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Analysis runs on the blocking pool so
// that a long series never stalls the async workers.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app_state::{AppState, StoredAnalysis};
use crate::batch::{run_batch, BatchReport};
use crate::market_data::loader::{into_bars, is_valid_stock_id, RawBar};

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/config", get(config))
        .route("/api/v1/errors", get(recent_errors))
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/analysis", get(all_analyses))
        .route("/api/v1/analysis/:stock_id", get(analysis_for))
        .route("/api/v1/batch", post(batch))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    results_cached: usize,
    state_version: u64,
    uptime_seconds: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        results_cached: state.results_cached(),
        state_version: state.current_state_version(),
        uptime_seconds: state.uptime_seconds(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Config & error log (read-only)
// =============================================================================

async fn config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.runtime_config.read().clone();
    Json(config)
}

async fn recent_errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let errors = state.recent_errors.read().clone();
    Json(errors)
}

// =============================================================================
// On-demand analysis
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeRequest {
    stock_id: String,
    bars: Vec<RawBar>,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<StoredAnalysis>, ApiError> {
    let stock_id = req.stock_id.trim().to_string();
    if stock_id.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "stock_id must not be empty"));
    }
    if !is_valid_stock_id(&stock_id) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("invalid stock_id '{stock_id}'"),
        ));
    }

    let bars = into_bars(req.bars);
    let orchestrator = state.orchestrator();
    let id = stock_id.clone();

    let outcome = tokio::task::spawn_blocking(move || orchestrator.analyze(&id, &bars))
        .await
        .map_err(|e| {
            warn!(stock_id = %stock_id, error = %e, "analysis task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "analysis task failed")
        })?;

    match outcome {
        Ok(result) => {
            let stored = state.store_result(Uuid::new_v4(), result);
            info!(
                stock_id = %stock_id,
                score = stored.result.composite.score,
                recommendation = %stored.result.composite.recommendation,
                "on-demand analysis stored"
            );
            Ok(Json(stored))
        }
        Err(e) => {
            warn!(stock_id = %stock_id, error = %e, "analysis rejected");
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "kind": e.kind(),
                    "details": e,
                })),
            ))
        }
    }
}

// =============================================================================
// Stored results
// =============================================================================

async fn all_analyses(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.all_results())
}

async fn analysis_for(
    State(state): State<Arc<AppState>>,
    Path(stock_id): Path<String>,
) -> Result<Json<StoredAnalysis>, ApiError> {
    state.latest(&stock_id).map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("no analysis stored for '{stock_id}'"),
        )
    })
}

// =============================================================================
// Batch
// =============================================================================

#[derive(Deserialize)]
struct BatchRequest {
    #[serde(default)]
    symbols: Option<Vec<String>>,
}

async fn batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchReport>, ApiError> {
    run_batch(state, req.symbols).await.map(Json).map_err(|e| {
        warn!(error = %e, "batch run failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
    })
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::market_data::bar::fixtures::random_walk;
    use crate::runtime_config::RuntimeConfig;

    fn app() -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(RuntimeConfig::default()));
        (state.clone(), router(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (_, app) = app();
        let response = app.oneshot(get_request("/api/v1/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["results_cached"], 0);
    }

    #[tokio::test]
    async fn short_series_is_unprocessable() {
        let (_, app) = app();
        let bars = serde_json::to_value(random_walk(10, 1)).unwrap();
        let response = app
            .oneshot(post_json(
                "/api/v1/analyze",
                serde_json::json!({ "stock_id": "005930", "bars": bars }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "too_short");
        assert_eq!(body["details"]["actual"], 10);
    }

    #[tokio::test]
    async fn missing_field_is_reported_as_missing_column() {
        let (_, app) = app();
        let mut bars = serde_json::to_value(random_walk(30, 2)).unwrap();
        bars[4].as_object_mut().unwrap().remove("close");
        let response = app
            .oneshot(post_json(
                "/api/v1/analyze",
                serde_json::json!({ "stock_id": "X", "bars": bars }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "missing_column");
        assert_eq!(body["details"]["column"], "close");
    }

    #[tokio::test]
    async fn analyze_then_fetch() {
        let (state, app) = app();
        let bars = serde_json::to_value(random_walk(120, 3)).unwrap();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/analyze",
                serde_json::json!({ "stock_id": "000660", "bars": bars }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stored = body_json(response).await;
        assert_eq!(stored["result"]["stock_id"], "000660");
        assert_eq!(state.results_cached(), 1);

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/analysis/000660"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["run_id"], stored["run_id"]);

        let response = app.clone().oneshot(get_request("/api/v1/analysis")).await.unwrap();
        let all = body_json(response).await;
        assert_eq!(all.as_array().unwrap().len(), 1);

        let response = app.oneshot(get_request("/api/v1/analysis/UNKNOWN")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn batch_endpoint_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let bars = serde_json::to_string(&random_walk(50, 4)).unwrap();
        std::fs::write(dir.path().join("AAA.json"), bars).unwrap();

        let state = Arc::new(AppState::new(RuntimeConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        }));
        let app = router(state);

        let response = app
            .oneshot(post_json(
                "/api/v1/batch",
                serde_json::json!({ "symbols": ["AAA", "NOPE"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["succeeded"], serde_json::json!(["AAA"]));
        assert_eq!(report["failed"][0]["stock_id"], "NOPE");
    }

    #[tokio::test]
    async fn path_like_stock_id_is_rejected() {
        let (state, app) = app();
        let bars = serde_json::to_value(random_walk(30, 5)).unwrap();
        let response = app
            .oneshot(post_json(
                "/api/v1/analyze",
                serde_json::json!({ "stock_id": "../etc/passwd", "bars": bars }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.results_cached(), 0);
    }
}

//! Router configuration for the HTTP API.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/sync/balance", post(handlers::sync_balance))
        .route("/sync/full", post(handlers::sync_full))
        .route("/sync/data/{device_id}", get(handlers::user_data))
        .route(
            "/config",
            get(handlers::get_config).put(handlers::update_config),
        )
        .route(
            "/config/questions",
            get(handlers::get_questions).put(handlers::update_questions),
        );

    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Repository;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let repository = Arc::new(Repository::in_memory(0.001).unwrap());
        create_router(AppState::new(repository))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn questions(count: usize) -> Value {
        let items: Vec<Value> = (0..count)
            .map(|i| json!({"id": i, "text": format!("Q{i}?"), "yesPoints": 5, "noPoints": -1}))
            .collect();
        json!({ "questions": items })
    }

    #[tokio::test]
    async fn balance_requires_fields() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/api/sync/balance", Some(json!({"balance": 10}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: balance, deviceId");

        let (status, _) = send(&app, Method::POST, "/api/sync/balance", Some(json!({"deviceId": "d"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_balance_is_accepted() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/sync/balance",
            Some(json!({"balance": 0, "history": null, "timestamp": 5, "deviceId": "d"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Balance synced successfully");
        assert!(body.get("entriesProcessed").is_none());
    }

    #[tokio::test]
    async fn balance_sync_is_readable() {
        let app = app();
        let request = json!({
            "balance": 110,
            "history": {"timestamp": 1_000, "action": "Answered: Did you exercise tod...", "points": 10},
            "timestamp": 1_000,
            "deviceId": "device_1_abc123",
        });
        let (status, _) = send(&app, Method::POST, "/api/sync/balance", Some(request)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, "/api/sync/data/device_1_abc123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["deviceId"], "device_1_abc123");
        assert_eq!(body["data"]["balance"], 110);
        assert_eq!(body["data"]["lastSync"], 1_000);
        assert_eq!(body["data"]["history"][0]["points"], 10);
    }

    #[tokio::test]
    async fn malformed_history_entry_rejected() {
        let app = app();
        let request = json!({"balance": 1, "history": {"points": "lots"}, "deviceId": "d"});
        let (status, _) = send(&app, Method::POST, "/api/sync/balance", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/sync/data/d", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn full_sync_counts_entries() {
        let app = app();
        let request = json!({
            "balance": 105,
            "history": [
                {"timestamp": 2, "action": "Answered: b...", "points": -5},
                {"timestamp": 1, "action": "Answered: a...", "points": 10},
            ],
            "timestamp": 3,
            "deviceId": "d",
        });
        let (status, body) = send(&app, Method::POST, "/api/sync/full", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entriesProcessed"], 2);
        assert_eq!(body["message"], "Full history synced successfully");

        let (_, body) = send(&app, Method::GET, "/api/sync/data/d", None).await;
        assert_eq!(body["data"]["history"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["history"][0]["timestamp"], 2);
    }

    #[tokio::test]
    async fn full_sync_requires_history_list() {
        let app = app();
        let request = json!({"balance": 5, "history": {"action": "x", "points": 1}, "deviceId": "d"});
        let (status, body) = send(&app, Method::POST, "/api/sync/full", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: balance, history, deviceId");
    }

    #[tokio::test]
    async fn unknown_device_is_404() {
        let (status, body) = send(&app(), Method::GET, "/api/sync/data/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Device not found");
    }

    #[tokio::test]
    async fn config_has_defaults() {
        let (status, body) = send(&app(), Method::GET, "/api/config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["config"]["tndRate"], 0.001);
        assert_eq!(body["config"]["questions"].as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn config_update_round_trips() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/config",
            Some(json!({"tndRate": 0.002, "motd": "wake up"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Configuration updated successfully");

        let (_, body) = send(&app, Method::GET, "/api/config", None).await;
        assert_eq!(body["config"]["tndRate"], 0.002);
        assert_eq!(body["config"]["motd"], "wake up");
    }

    #[tokio::test]
    async fn config_update_requires_object() {
        let (status, _) = send(&app(), Method::PUT, "/api/config", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn too_many_questions_leave_pool_unchanged() {
        let app = app();
        let (status, body) = send(&app, Method::PUT, "/api/config/questions", Some(questions(31))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Maximum 30 questions allowed");

        let (_, body) = send(&app, Method::GET, "/api/config/questions", None).await;
        assert_eq!(body["questions"][0]["text"], "Did you complete your morning routine?");
    }

    #[tokio::test]
    async fn full_question_pool_is_stored() {
        let app = app();
        let (status, body) = send(&app, Method::PUT, "/api/config/questions", Some(questions(30))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Questions updated successfully");

        let (status, body) = send(&app, Method::GET, "/api/config/questions", None).await;
        assert_eq!(status, StatusCode::OK);
        let stored = body["questions"].as_array().unwrap();
        assert_eq!(stored.len(), 30);
        assert_eq!(stored[29]["text"], "Q29?");
    }

    #[tokio::test]
    async fn questions_must_be_list() {
        let (status, body) = send(
            &app(),
            Method::PUT,
            "/api/config/questions",
            Some(json!({"questions": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Questions must be an array");
    }

    #[tokio::test]
    async fn invalid_json_is_bad_request() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/sync/balance")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_and_index() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["sync"]["balance"], "POST /api/sync/balance");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, body) = send(&app(), Method::GET, "/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Endpoint not found");
        assert_eq!(body["error"]["status"], 404);
    }
}

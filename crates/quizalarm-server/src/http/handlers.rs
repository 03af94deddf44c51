//! HTTP handlers for the sync and config endpoints.
//!
//! Bodies are taken as raw JSON so that missing fields produce the contract's
//! 400 messages instead of an extractor rejection.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{SecondsFormat, Utc};
use quizalarm_api::{HistoryEntry, QUESTION_POOL_SIZE, SyncAck, UserDataEnvelope};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::dto::{
    ConfigResponse, HealthResponse, IncomingEntry, MessageResponse, QuestionsResponse,
    RouteNotFound, RouteNotFoundDetail,
};
use super::error::AppError;
use super::state::AppState;
use crate::{Repository, RepositoryResult};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type JsonBody = Result<Json<Value>, JsonRejection>;

/// Run a repository call off the async workers
async fn with_repository<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Repository) -> RepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let repository = state.repository.clone();
    Ok(tokio::task::spawn_blocking(move || f(&repository)).await??)
}

fn integer_field(body: &Value, key: &str) -> Option<i64> {
    let value = body.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

fn device_id_field(body: &Value) -> Option<String> {
    body.get("deviceId")?
        .as_str()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn parse_entry(value: &Value, fallback_timestamp: i64) -> Result<HistoryEntry, AppError> {
    let entry: IncomingEntry = serde_json::from_value(value.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid history entry: {e}")))?;
    Ok(HistoryEntry::new(
        entry.timestamp.unwrap_or(fallback_timestamp),
        entry.action,
        entry.points,
    ))
}

// =============================================================================
// Sync
// =============================================================================

/// POST /api/sync/balance
pub async fn sync_balance(State(state): State<AppState>, body: JsonBody) -> HandlerResult<SyncAck> {
    let Json(body) = body?;

    let (Some(balance), Some(device_id)) = (integer_field(&body, "balance"), device_id_field(&body))
    else {
        return Err(AppError::BadRequest(
            "Missing required fields: balance, deviceId".into(),
        ));
    };
    let timestamp = integer_field(&body, "timestamp").unwrap_or_else(quizalarm_util::now_millis);

    let entries = match body.get("history") {
        None | Some(Value::Null) => Vec::new(),
        Some(entry) => vec![parse_entry(entry, timestamp)?],
    };

    let logged_id = device_id.clone();
    with_repository(&state, move |repo| {
        repo.save_sync(&device_id, balance, timestamp, &entries)
    })
    .await?;

    info!(device_id = %logged_id, balance, "Balance synced");
    Ok(Json(SyncAck {
        success: true,
        message: "Balance synced successfully".into(),
        entries_processed: None,
        timestamp: quizalarm_util::now_millis(),
    }))
}

/// POST /api/sync/full
pub async fn sync_full(State(state): State<AppState>, body: JsonBody) -> HandlerResult<SyncAck> {
    let Json(body) = body?;

    let balance = integer_field(&body, "balance");
    let history = body.get("history").and_then(Value::as_array);
    let (Some(balance), Some(history), Some(device_id)) = (balance, history, device_id_field(&body))
    else {
        return Err(AppError::BadRequest(
            "Missing required fields: balance, history, deviceId".into(),
        ));
    };
    let timestamp = integer_field(&body, "timestamp").unwrap_or_else(quizalarm_util::now_millis);

    let entries = history
        .iter()
        .map(|entry| parse_entry(entry, timestamp))
        .collect::<Result<Vec<_>, _>>()?;

    let logged_id = device_id.clone();
    let processed = with_repository(&state, move |repo| {
        repo.save_sync(&device_id, balance, timestamp, &entries)
    })
    .await?;

    info!(device_id = %logged_id, balance, entries = processed, "Full history synced");
    Ok(Json(SyncAck {
        success: true,
        message: "Full history synced successfully".into(),
        entries_processed: Some(processed),
        timestamp: quizalarm_util::now_millis(),
    }))
}

/// GET /api/sync/data/{device_id}
pub async fn user_data(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> HandlerResult<UserDataEnvelope> {
    let data = with_repository(&state, move |repo| repo.user_data(&device_id)).await?;

    match data {
        Some(data) => Ok(Json(UserDataEnvelope {
            success: true,
            data,
        })),
        None => Err(AppError::NotFound("Device not found".into())),
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> HandlerResult<ConfigResponse> {
    let config = with_repository(&state, |repo| repo.config()).await?;
    Ok(Json(ConfigResponse {
        success: true,
        config,
    }))
}

/// PUT /api/config
pub async fn update_config(
    State(state): State<AppState>,
    body: JsonBody,
) -> HandlerResult<MessageResponse> {
    let Json(body) = body?;
    let Value::Object(updates) = body else {
        return Err(AppError::BadRequest(
            "Configuration must be a JSON object".into(),
        ));
    };

    with_repository(&state, move |repo| repo.update_config(&updates)).await?;
    Ok(Json(MessageResponse::ok("Configuration updated successfully")))
}

/// GET /api/config/questions
pub async fn get_questions(State(state): State<AppState>) -> HandlerResult<QuestionsResponse> {
    let questions = with_repository(&state, |repo| repo.questions()).await?;
    Ok(Json(QuestionsResponse {
        success: true,
        questions,
    }))
}

/// PUT /api/config/questions
pub async fn update_questions(
    State(state): State<AppState>,
    body: JsonBody,
) -> HandlerResult<MessageResponse> {
    let Json(body) = body?;
    let Some(questions) = body.get("questions").and_then(Value::as_array).cloned() else {
        return Err(AppError::BadRequest("Questions must be an array".into()));
    };
    if questions.len() > QUESTION_POOL_SIZE {
        return Err(AppError::BadRequest(format!(
            "Maximum {QUESTION_POOL_SIZE} questions allowed"
        )));
    }

    let count = questions.len();
    with_repository(&state, move |repo| repo.set_questions(&questions)).await?;
    info!(count, "Question pool replaced");
    Ok(Json(MessageResponse::ok("Questions updated successfully")))
}

// =============================================================================
// Service
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started.elapsed().as_secs_f64(),
    })
}

/// GET /
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "name": "quizalarm sync server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "sync": {
                "balance": "POST /api/sync/balance",
                "full": "POST /api/sync/full",
                "data": "GET /api/sync/data/{deviceId}",
            },
            "config": {
                "get": "GET /api/config",
                "update": "PUT /api/config",
                "questions": "GET /api/config/questions",
                "updateQuestions": "PUT /api/config/questions",
            },
        },
    }))
}

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<RouteNotFound>) {
    debug!("Unknown route requested");
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: RouteNotFoundDetail {
                message: "Endpoint not found".into(),
                status: StatusCode::NOT_FOUND.as_u16(),
            },
        }),
    )
}

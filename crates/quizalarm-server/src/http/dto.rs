//! Response bodies that are not part of the device contract

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{success, message}` acknowledgement of a write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `GET /api/config` body. Unlike the device-side envelope this keeps every
/// stored key as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub success: bool,
    pub questions: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339
    pub timestamp: String,
    /// Seconds since start
    pub uptime: f64,
}

/// A single history entry as sent by a device. The timestamp may be left
/// out, in which case the request's timestamp is used.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingEntry {
    pub action: String,
    pub points: i64,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteNotFound {
    pub error: RouteNotFoundDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteNotFoundDetail {
    pub message: String,
    pub status: u16,
}

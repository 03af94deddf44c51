//! Bodies of the sync HTTP contract
//!
//! All field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use quizalarm_util::QuestionId;

use crate::{HistoryEntry, Question};

/// `POST /api/sync/balance` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSyncRequest {
    pub balance: i64,
    /// Adjustment that produced this balance, if any
    pub history: Option<HistoryEntry>,
    pub timestamp: i64,
    pub device_id: String,
}

/// `POST /api/sync/full` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSyncRequest {
    pub balance: i64,
    pub history: Vec<HistoryEntry>,
    pub timestamp: i64,
    pub device_id: String,
}

/// Acknowledgement returned by both sync endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAck {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_processed: Option<usize>,
    pub timestamp: i64,
}

/// Remote configuration document.
///
/// Only `tndRate` and `questions` are interpreted; other keys are carried
/// through untouched.
/// A `tndRate` that is neither a number nor a numeric string reads as absent.
/// Question entries that don't decode are dropped; an entry without an `id`
/// takes its position in the array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(
        default,
        deserialize_with = "lenient_rate",
        skip_serializing_if = "Option::is_none"
    )]
    pub tnd_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_questions",
        skip_serializing_if = "Option::is_none"
    )]
    pub questions: Option<Vec<Question>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteConfig {
    /// Decode a `GET /api/config` body: the `{success, config}` envelope, or
    /// a bare config object when the body has no `config` key
    pub fn from_response(body: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut map) = body else {
            return Err(serde::de::Error::custom("config body is not an object"));
        };
        match map.remove("config") {
            Some(config @ Value::Object(_)) => {
                if map.get("success").and_then(Value::as_bool) == Some(false) {
                    return Err(serde::de::Error::custom("server reported failure"));
                }
                serde_json::from_value(config)
            }
            Some(_) => Err(serde::de::Error::custom("`config` is not an object")),
            None => serde_json::from_value(Value::Object(map)),
        }
    }

    /// Nothing the device interprets was sent
    pub fn is_empty(&self) -> bool {
        self.tnd_rate.is_none() && self.questions.is_none()
    }
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let rate = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(rate.filter(|r| r.is_finite() && *r >= 0.0))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LooseQuestion {
    id: Option<QuestionId>,
    text: String,
    yes_points: i32,
    no_points: i32,
}

fn lenient_questions<'de, D>(deserializer: D) -> Result<Option<Vec<Question>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let sent = items.len();
    let questions: Vec<Question> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let loose: LooseQuestion = serde_json::from_value(item).ok()?;
            Some(Question {
                id: loose.id.unwrap_or(QuestionId::new(index as u32)),
                text: loose.text,
                yes_points: loose.yes_points,
                no_points: loose.no_points,
            })
        })
        .collect();

    if sent > 0 && questions.is_empty() {
        return Ok(None);
    }
    Ok(Some(questions))
}

/// Server-side record of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub device_id: String,
    pub balance: i64,
    pub last_sync: Option<i64>,
    /// Seconds since the Unix epoch
    pub created_at: i64,
    /// Newest first
    pub history: Vec<HistoryEntry>,
}

/// `GET /api/sync/data/{deviceId}` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDataEnvelope {
    pub success: bool,
    pub data: UserData,
}

/// Error body of the sync endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

//! Responses in the serverless proxy shape

use hookfmt_core::{DisplayMode, Error};
use serde::Serialize;
use std::collections::BTreeMap;

/// Body returned after a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessBody {
    pub message: String,
    pub converted: bool,
    pub mode: DisplayMode,
    pub destination: String,
}

/// Body returned for any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        if err.is_client_error() {
            ErrorBody {
                error: err.to_string(),
                message: None,
            }
        } else {
            ErrorBody {
                error: "Internal server error".to_string(),
                message: Some(err.to_string()),
            }
        }
    }
}

/// An HTTP response as returned to the serverless runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    pub fn json(status_code: u16, body: &impl Serialize) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            log::error!("failed to serialize response body: {e}");
            r#"{"error":"Internal server error"}"#.to_string()
        });
        Self {
            status_code,
            headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body,
        }
    }

    pub fn success(body: &SuccessBody) -> Self {
        Self::json(200, body)
    }

    pub fn error(err: &Error) -> Self {
        Self::json(err.status_code(), &ErrorBody::from(err))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body parsed back into JSON, for callers that inspect it.
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

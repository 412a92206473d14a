//! Serverless event shapes and their conversion into [`InboundRequest`].
//!
//! Two platforms are supported:
//! - Lambda-style events (API Gateway REST and HTTP APIs, Function URLs and
//!   simple test harnesses that put parameters under `query`)
//! - Fn-style invocations, where the query string arrives in the
//!   `Fn-Http-Request-Url` header

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

use crate::request::{InboundRequest, DESTINATION_PARAM, MODE_PARAM};

/// Header carrying the original request path and query on Fn platforms.
pub const FN_REQUEST_URL_HEADER: &str = "Fn-Http-Request-Url";

/// A Lambda proxy integration event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LambdaEvent {
    pub body: Option<Value>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub query: Option<HashMap<String, String>>,
    pub raw_query_string: Option<String>,
    pub is_base64_encoded: bool,
}

impl LambdaEvent {
    /// Parse an event from its JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Look a parameter up in `queryStringParameters`, then `query`, then
    /// `rawQueryString`. Empty values count as missing.
    pub fn param(&self, name: &str) -> Option<String> {
        let from_map = |map: &Option<HashMap<String, String>>| {
            map.as_ref()
                .and_then(|m| m.get(name))
                .filter(|v| !v.is_empty())
                .cloned()
        };

        from_map(&self.query_string_parameters)
            .or_else(|| from_map(&self.query))
            .or_else(|| {
                self.raw_query_string
                    .as_deref()
                    .and_then(|raw| query_pairs(raw).remove(name))
                    .filter(|v| !v.is_empty())
            })
    }
}

impl From<LambdaEvent> for InboundRequest {
    fn from(event: LambdaEvent) -> Self {
        let mut query = HashMap::new();
        for name in [DESTINATION_PARAM, MODE_PARAM] {
            if let Some(value) = event.param(name) {
                query.insert(name.to_string(), value);
            }
        }

        InboundRequest {
            body: event.body.and_then(body_text),
            query,
            is_base64_encoded: event.is_base64_encoded,
        }
    }
}

/// An Fn-style function invocation.
#[derive(Debug, Clone, Default)]
pub struct FnInvocation {
    /// Raw input as received by the function.
    pub input: String,
    /// Request headers; each may carry several values.
    pub headers: HashMap<String, Vec<String>>,
    /// Function configuration, used as query parameters when the request
    /// URL header is absent.
    pub config: HashMap<String, String>,
}

impl FnInvocation {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// First value of the request URL header, if any.
    fn request_url(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(FN_REQUEST_URL_HEADER))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl From<FnInvocation> for InboundRequest {
    fn from(invocation: FnInvocation) -> Self {
        let query = match invocation.request_url() {
            Some(path) => {
                let query = path.split_once('?').map(|(_, q)| q).unwrap_or_default();
                query_pairs(query)
            }
            None => invocation.config.clone(),
        };

        InboundRequest {
            body: Some(invocation.input),
            query,
            is_base64_encoded: false,
        }
    }
}

/// Parse a URL query string into a map. Later duplicates are ignored.
fn query_pairs(raw: &str) -> HashMap<String, String> {
    let raw = raw.trim_start_matches('?');
    let mut url = match Url::parse("https://dummy/") {
        Ok(url) => url,
        Err(_) => return HashMap::new(),
    };
    url.set_query(Some(raw));

    let mut pairs = HashMap::new();
    for (name, value) in url.query_pairs() {
        pairs.entry(name.into_owned()).or_insert_with(|| value.into_owned());
    }
    pairs
}

/// Event bodies are usually strings, but harnesses may send raw JSON.
fn body_text(body: Value) -> Option<String> {
    match body {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

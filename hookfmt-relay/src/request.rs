//! Platform-independent inbound request

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hookfmt_core::{Error, Result};
use std::collections::HashMap;

/// Query parameter holding the destination webhook URL.
pub const DESTINATION_PARAM: &str = "d";
/// Query parameter selecting the display mode.
pub const MODE_PARAM: &str = "mode";

/// A request after the platform adapter has normalized it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    pub body: Option<String>,
    pub query: HashMap<String, String>,
    pub is_base64_encoded: bool,
}

impl InboundRequest {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Builder-style query parameter setter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// A query parameter, treating empty values as absent.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn destination(&self) -> Option<&str> {
        self.param(DESTINATION_PARAM)
    }

    pub fn mode(&self) -> Option<&str> {
        self.param(MODE_PARAM)
    }

    /// The body as text, base64-decoded when flagged.
    ///
    /// Returns `Ok(None)` for a missing or empty body.
    pub fn decoded_body(&self) -> Result<Option<String>> {
        let Some(body) = self.body.as_deref().filter(|body| !body.is_empty()) else {
            return Ok(None);
        };

        if !self.is_base64_encoded {
            return Ok(Some(body.to_string()));
        }

        let bytes = BASE64
            .decode(body.trim())
            .map_err(|e| Error::InternalError(format!("Invalid base64 body: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::InternalError(format!("Body is not valid UTF-8: {e}")))?;

        Ok(Some(text).filter(|text| !text.is_empty()))
    }
}

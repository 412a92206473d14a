//! Error type shared by the formatting pipeline and the relay.

use thiserror::Error;

/// Every failure the pipeline can report to its caller.
///
/// The first three variants are caused by the request itself and map to
/// HTTP 400. Everything else is a server-side failure and maps to 500.
#[derive(Debug, Error)]
pub enum Error {
    /// A required query parameter was absent or empty.
    #[error("Missing required parameter: {name} ({description})")]
    MissingParameter {
        /// Parameter name as it appears in the query string.
        name: &'static str,
        /// What the parameter is for.
        description: &'static str,
    },

    /// The destination URL is malformed or not on the allow-list.
    #[error("Invalid Slack webhook URL")]
    InvalidDestination,

    /// The request carried no body to forward.
    #[error("Missing request body")]
    MissingBody,

    /// The body could not be parsed as JSON or re-serialized as YAML.
    #[error("JSON parse error: {0}")]
    EncodingFailure(String),

    /// The webhook answered with a non-2xx status or could not be reached.
    #[error("{}", delivery_message(.status, .body))]
    DeliveryFailure {
        /// HTTP status, absent for transport errors.
        status: Option<u16>,
        /// Response body text, or the transport error text.
        body: String,
    },

    /// Anything not covered above.
    #[error("{0}")]
    InternalError(String),
}

fn delivery_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(status) => format!("Slack API error: {status} - {body}"),
        None => format!("Slack request failed: {body}"),
    }
}

impl Error {
    /// Shorthand for the missing `d` parameter.
    pub fn missing_destination() -> Self {
        Self::MissingParameter {
            name: "d",
            description: "destination webhook URL",
        }
    }

    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. } | Self::InvalidDestination | Self::MissingBody
        )
    }

    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::EncodingFailure(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::EncodingFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

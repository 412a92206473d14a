//! The request pipeline: validate, classify, build, deliver.

use hookfmt_core::{
    classify, redact, Config, DestinationValidator, DisplayMode, Error, MessagePayload,
    PayloadBuilder, Result,
};

use crate::delivery::Sink;
use crate::request::InboundRequest;
use crate::response::{Response, SuccessBody};

/// What a successful request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub converted: bool,
    pub mode: DisplayMode,
    /// Redacted destination URL.
    pub destination: String,
}

/// Forwards inbound requests to a webhook through a [`Sink`].
///
/// Holds no per-request state; one value can serve any number of requests.
#[derive(Debug, Clone)]
pub struct Relay<S> {
    validator: DestinationValidator,
    builder: PayloadBuilder,
    default_mode: DisplayMode,
    sink: S,
}

impl<S: Sink> Relay<S> {
    pub fn new(config: &Config, sink: S) -> Self {
        Self {
            validator: config.validator(),
            builder: config.payload_builder(),
            default_mode: config.defaults.mode,
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handle a request and turn the result into a response.
    pub fn handle(&self, request: &InboundRequest) -> Response {
        match self.process(request) {
            Ok(outcome) => Response::success(&SuccessBody {
                message: "Successfully sent to Slack".to_string(),
                converted: outcome.converted,
                mode: outcome.mode,
                destination: outcome.destination,
            }),
            Err(err) => {
                if err.is_client_error() {
                    log::warn!("rejected request: {err}");
                } else {
                    log::error!("request failed: {err}");
                }
                Response::error(&err)
            }
        }
    }

    /// Run the pipeline, reporting failures as errors.
    pub fn process(&self, request: &InboundRequest) -> Result<Outcome> {
        let destination = request.destination().ok_or_else(Error::missing_destination)?;
        let mode = self.resolve_mode(request.mode());

        if !self.validator.is_allowed(destination) {
            return Err(Error::InvalidDestination);
        }
        let redacted = redact(destination);

        let body = request.decoded_body()?.ok_or(Error::MissingBody)?;

        let kind = classify(&body);
        log::debug!("forwarding {kind} body to {redacted} in {mode} mode");

        let payload = self.builder.build(&body, kind, mode)?;
        self.deliver(destination, &redacted, &payload)?;

        Ok(Outcome {
            converted: kind.is_structured(),
            mode,
            destination: redacted,
        })
    }

    fn resolve_mode(&self, requested: Option<&str>) -> DisplayMode {
        match requested.map(str::parse::<DisplayMode>) {
            None => self.default_mode,
            Some(Ok(mode)) => mode,
            Some(Err(err)) => {
                log::warn!("{err}; using {}", self.default_mode);
                self.default_mode
            }
        }
    }

    fn deliver(&self, url: &str, redacted: &str, payload: &MessagePayload) -> Result<()> {
        let delivery = self.sink.deliver(url, payload)?;
        log::info!("delivered to {redacted}: HTTP {}", delivery.status);
        Ok(())
    }
}

//! hookfmt Relay - Serverless request handling around the core pipeline
//!
//! This crate connects hookfmt-core to the outside world:
//! - Event adapters for Lambda-style and Fn-style platforms
//! - The request handler (validation, formatting, delivery)
//! - Webhook delivery over HTTP (`delivery` feature)
//! - Responses in the serverless proxy shape

pub mod adapter;
pub mod delivery;
pub mod handler;
pub mod request;
pub mod response;

// Re-export main types
pub use adapter::{FnInvocation, LambdaEvent};
pub use delivery::{Delivery, Sink};
pub use handler::{Outcome, Relay};
pub use request::InboundRequest;
pub use response::Response;

#[cfg(feature = "delivery")]
pub use delivery::WebhookSink;

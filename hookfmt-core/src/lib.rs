//! hookfmt Core - Formatting pipeline for Slack webhook relays
//!
//! This crate contains the request-independent logic of hookfmt:
//! - Classifying bodies as JSON or plain text
//! - JSON to YAML encoding
//! - Line-by-line Slack markup for the YAML
//! - Message payload assembly in three display modes
//! - Destination allow-listing and redaction
//! - Configuration management

pub mod annotate;
pub mod classify;
pub mod config;
pub mod destination;
pub mod encode;
pub mod error;
pub mod payload;

// Re-export commonly used types
pub use annotate::annotate;
pub use classify::{classify, ContentKind};
pub use config::Config;
pub use destination::{redact, DestinationValidator};
pub use error::{Error, Result};
pub use payload::{DisplayMode, MessagePayload, PayloadBuilder};

//! Decides whether an inbound body is JSON or plain text.

use std::fmt;

/// How a request body will be forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A JSON object or array; converted to annotated YAML.
    Structured,
    /// Anything else; forwarded verbatim.
    PlainText,
}

impl ContentKind {
    pub fn is_structured(&self) -> bool {
        matches!(self, ContentKind::Structured)
    }

    fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Structured => "structured",
            ContentKind::PlainText => "plain text",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request body.
///
/// A body is structured only when, after trimming, it is delimited by a
/// matching `{}` or `[]` pair and parses as JSON. Parse errors are not
/// reported; they simply make the body plain text.
pub fn classify(body: &str) -> ContentKind {
    let trimmed = body.trim();

    let delimited = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !delimited {
        return ContentKind::PlainText;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(_) => ContentKind::Structured,
        Err(err) => {
            log::debug!("body looks like JSON but does not parse: {err}");
            ContentKind::PlainText
        }
    }
}

//! Slack message payloads and the builder that assembles them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::annotate::annotate;
use crate::classify::ContentKind;
use crate::config::PresentationConfig;
use crate::encode::json_to_yaml;
use crate::error::Result;

/// How structured content is laid out in the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Raw YAML in a code fence.
    Simple,
    /// Header, annotated YAML, divider and footer as top-level blocks.
    #[default]
    Block,
    /// The `Block` layout inside a colored attachment.
    Attachments,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Simple => "simple",
            DisplayMode::Block => "block",
            DisplayMode::Attachments => "attachments",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown display mode '{0}' (expected simple, block or attachments)")]
pub struct UnknownMode(pub String);

impl FromStr for DisplayMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "simple" => Ok(DisplayMode::Simple),
            "block" => Ok(DisplayMode::Block),
            "attachments" => Ok(DisplayMode::Attachments),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// A Block Kit text object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        TextObject::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TextObject::PlainText { text, .. } | TextObject::Mrkdwn { text } => text,
        }
    }
}

/// One presentation element of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Header { text: TextObject },
    Section { text: TextObject },
    Divider,
    Context { elements: Vec<TextObject> },
}

/// A colored side-bar container for elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub color: String,
    pub blocks: Vec<Element>,
}

/// The body posted to the webhook.
///
/// Serializes without a tag; the field set alone tells Slack which shape
/// it is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessagePayload {
    /// Non-JSON bodies, forwarded verbatim.
    PlainText { text: String },
    Simple { text: String, blocks: Vec<Element> },
    Block { text: String, blocks: Vec<Element> },
    Attachments { text: String, attachments: Vec<Attachment> },
}

impl MessagePayload {
    /// Display mode this payload was built for, `None` for plain text.
    pub fn mode(&self) -> Option<DisplayMode> {
        match self {
            MessagePayload::PlainText { .. } => None,
            MessagePayload::Simple { .. } => Some(DisplayMode::Simple),
            MessagePayload::Block { .. } => Some(DisplayMode::Block),
            MessagePayload::Attachments { .. } => Some(DisplayMode::Attachments),
        }
    }

    /// Top-level notification text.
    pub fn text(&self) -> &str {
        match self {
            MessagePayload::PlainText { text }
            | MessagePayload::Simple { text, .. }
            | MessagePayload::Block { text, .. }
            | MessagePayload::Attachments { text, .. } => text,
        }
    }

    /// All elements in display order, including those inside attachments.
    pub fn elements(&self) -> Vec<&Element> {
        match self {
            MessagePayload::PlainText { .. } => Vec::new(),
            MessagePayload::Simple { blocks, .. } | MessagePayload::Block { blocks, .. } => {
                blocks.iter().collect()
            }
            MessagePayload::Attachments { attachments, .. } => attachments
                .iter()
                .flat_map(|attachment| attachment.blocks.iter())
                .collect(),
        }
    }

    /// Serialize to the JSON sent over the wire.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds [`MessagePayload`]s using a fixed set of presentation strings.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    presentation: PresentationConfig,
}

impl PayloadBuilder {
    pub fn new(presentation: PresentationConfig) -> Self {
        Self { presentation }
    }

    pub fn presentation(&self) -> &PresentationConfig {
        &self.presentation
    }

    /// Build a payload, stamping the footer with the current time.
    pub fn build(
        &self,
        content: &str,
        kind: ContentKind,
        mode: DisplayMode,
    ) -> Result<MessagePayload> {
        self.build_at(content, kind, mode, Utc::now())
    }

    /// Build a payload with an explicit footer timestamp.
    ///
    /// Plain text ignores `mode`. Structured content that fails to encode
    /// is reported as [`crate::Error::EncodingFailure`].
    pub fn build_at(
        &self,
        content: &str,
        kind: ContentKind,
        mode: DisplayMode,
        timestamp: DateTime<Utc>,
    ) -> Result<MessagePayload> {
        if !kind.is_structured() {
            return Ok(MessagePayload::PlainText {
                text: content.to_string(),
            });
        }

        let yaml = json_to_yaml(content)?;
        let text = self.presentation.notification_text.clone();

        Ok(match mode {
            DisplayMode::Simple => MessagePayload::Simple {
                text,
                blocks: vec![Element::Section {
                    text: TextObject::mrkdwn(format!("```\n{yaml}```")),
                }],
            },
            DisplayMode::Block => MessagePayload::Block {
                text,
                blocks: self.detail_blocks(&yaml, timestamp),
            },
            DisplayMode::Attachments => MessagePayload::Attachments {
                text,
                attachments: vec![Attachment {
                    color: self.presentation.accent_color.clone(),
                    blocks: self.detail_blocks(&yaml, timestamp),
                }],
            },
        })
    }

    /// Header, annotated YAML, divider and footer.
    fn detail_blocks(&self, yaml: &str, timestamp: DateTime<Utc>) -> Vec<Element> {
        let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        vec![
            Element::Header {
                text: TextObject::plain(self.presentation.header_text.clone()),
            },
            Element::Section {
                text: TextObject::mrkdwn(annotate(yaml)),
            },
            Element::Divider,
            Element::Context {
                elements: vec![TextObject::mrkdwn(format!("📄 Format: YAML | ⏰ {stamp}"))],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    fn section_text(payload: &MessagePayload) -> String {
        payload
            .elements()
            .into_iter()
            .find_map(|element| match element {
                Element::Section { text } => Some(text.text().to_string()),
                _ => None,
            })
            .expect("payload has a section")
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("simple".parse::<DisplayMode>(), Ok(DisplayMode::Simple));
        assert_eq!("block".parse::<DisplayMode>(), Ok(DisplayMode::Block));
        assert_eq!("attachments".parse::<DisplayMode>(), Ok(DisplayMode::Attachments));
        assert_eq!(
            "fancy".parse::<DisplayMode>(),
            Err(UnknownMode("fancy".to_string()))
        );
        assert_eq!(DisplayMode::default(), DisplayMode::Block);
        assert_eq!(DisplayMode::Attachments.to_string(), "attachments");
    }

    #[test]
    fn plain_text_ignores_mode() -> Result<()> {
        let builder = PayloadBuilder::default();
        for mode in [DisplayMode::Simple, DisplayMode::Block, DisplayMode::Attachments] {
            let payload = builder.build("not json", ContentKind::PlainText, mode)?;
            assert_eq!(payload.mode(), None);
            assert_eq!(serde_json::to_value(&payload)?, json!({ "text": "not json" }));
        }
        Ok(())
    }

    #[test]
    fn simple_mode_fences_raw_yaml() -> Result<()> {
        let content = r#"{"a":1,"nested":{"b":"x"},"list":["one"]}"#;
        let payload = PayloadBuilder::default().build_at(
            content,
            ContentKind::Structured,
            DisplayMode::Simple,
            fixed_time(),
        )?;

        let yaml = json_to_yaml(content)?;
        assert_eq!(section_text(&payload), format!("```\n{yaml}```"));
        assert!(!section_text(&payload).contains('*'));
        assert_eq!(payload.elements().len(), 1);
        assert_eq!(payload.text(), "🚨 Alert Notification");
        Ok(())
    }

    #[test]
    fn block_mode_layout() -> Result<()> {
        let payload = PayloadBuilder::default().build_at(
            r#"{"a":1,"b":"x"}"#,
            ContentKind::Structured,
            DisplayMode::Block,
            fixed_time(),
        )?;

        let value = serde_json::to_value(&payload)?;
        assert_eq!(
            value,
            json!({
                "text": "🚨 Alert Notification",
                "blocks": [
                    { "type": "header", "text": { "type": "plain_text", "text": "📋 Alert Details", "emoji": true } },
                    { "type": "section", "text": { "type": "mrkdwn", "text": "*a:* 1\n*b:* x\n" } },
                    { "type": "divider" },
                    { "type": "context", "elements": [
                        { "type": "mrkdwn", "text": "📄 Format: YAML | ⏰ 2024-05-01T12:30:00.000Z" }
                    ] }
                ]
            })
        );
        Ok(())
    }

    #[test]
    fn attachments_mode_wraps_the_block_layout() -> Result<()> {
        let builder = PayloadBuilder::default();
        let content = r#"{"a":1}"#;
        let structured = ContentKind::Structured;
        let block = builder.build_at(content, structured, DisplayMode::Block, fixed_time())?;
        let attachments =
            builder.build_at(content, structured, DisplayMode::Attachments, fixed_time())?;

        let MessagePayload::Attachments { attachments: list, .. } = &attachments else {
            panic!("expected attachments payload, got {attachments:?}");
        };
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].color, "#ff6b6b");
        assert_eq!(block.elements(), attachments.elements());

        let value = serde_json::to_value(&attachments)?;
        assert!(value.get("blocks").is_none());
        assert_eq!(value["attachments"][0]["blocks"][2], json!({ "type": "divider" }));
        Ok(())
    }

    #[test]
    fn custom_presentation_is_used() -> Result<()> {
        let builder = PayloadBuilder::new(PresentationConfig {
            notification_text: "Deploy".to_string(),
            header_text: "Details".to_string(),
            accent_color: "#36a64f".to_string(),
        });
        let payload =
            builder.build(r#"{"ok":true}"#, ContentKind::Structured, DisplayMode::Attachments)?;
        let value = serde_json::to_value(&payload)?;
        assert_eq!(value["text"], "Deploy");
        assert_eq!(value["attachments"][0]["color"], "#36a64f");
        assert_eq!(value["attachments"][0]["blocks"][0]["text"]["text"], "Details");
        Ok(())
    }

    #[test]
    fn footer_timestamp_is_iso_8601() -> Result<()> {
        let payload = PayloadBuilder::default().build(
            r#"{"a":1}"#,
            ContentKind::Structured,
            DisplayMode::Block,
        )?;
        let footer = payload
            .elements()
            .into_iter()
            .find_map(|element| match element {
                Element::Context { elements } => Some(elements[0].text().to_string()),
                _ => None,
            })
            .expect("footer present");
        let stamp = footer.rsplit("⏰ ").next().expect("timestamp after marker");
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "bad timestamp {stamp}");
        assert!(stamp.ends_with('Z'));
        Ok(())
    }

    #[test]
    fn encoder_failure_propagates() {
        let err = PayloadBuilder::default()
            .build("{broken", ContentKind::Structured, DisplayMode::Block)
            .unwrap_err();
        assert!(matches!(err, Error::EncodingFailure(_)));
    }

    #[test]
    fn to_json_is_compact_wire_format() -> Result<()> {
        let payload = MessagePayload::PlainText {
            text: "hi".to_string(),
        };
        assert_eq!(payload.to_json()?, r#"{"text":"hi"}"#);
        Ok(())
    }
}

//! Line-by-line Slack markup for YAML produced by [`crate::encode`].
//!
//! Each line is rewritten on its own:
//! - `key: value` becomes `*key:* value`
//! - `key:` and `key: null` become `*key:*`
//! - `- item` becomes ``- `item` ``
//! - block scalars (`key: |`, `key: >-`, `key: |2-`, ...) get a bold key, and every line
//!   indented deeper than the opener is copied through untouched
//!
//! The only state carried between lines is whether a block scalar is open
//! and the indentation of the line that opened it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static BLOCK_SCALAR_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)([\w'-]+)(:\s*[|>](?:[1-9][-+]?|[-+][1-9]?)?\s*)$").expect("valid block scalar pattern")
});

static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([\w'-]+):\s*(.*)$").expect("valid key-value pattern"));

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*-\s+)(\S.*)$").expect("valid list item pattern"));

/// A single line of encoder output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub text: &'a str,
    /// Number of leading whitespace characters.
    pub indent: usize,
}

impl<'a> RawLine<'a> {
    pub fn new(text: &'a str) -> Self {
        let indent = text.chars().take_while(|c| c.is_whitespace()).count();
        Self { text, indent }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// The line without its surrounding whitespace.
    pub fn content(&self) -> &'a str {
        self.text.trim()
    }
}

/// Block scalar tracking for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatorState {
    in_literal_block: bool,
    literal_block_base_indent: usize,
}

impl AnnotatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_literal_block(&self) -> bool {
        self.in_literal_block
    }

    /// Indentation of the line that opened the current block, 0 when closed.
    pub fn literal_block_base_indent(&self) -> usize {
        self.literal_block_base_indent
    }

    fn open_block(&mut self, indent: usize) {
        self.in_literal_block = true;
        self.literal_block_base_indent = indent;
    }

    fn close_block(&mut self) {
        self.in_literal_block = false;
        self.literal_block_base_indent = 0;
    }

    /// Annotate one line, updating the block scalar state.
    pub fn annotate_line<'a>(&mut self, line: RawLine<'a>) -> Cow<'a, str> {
        if line.is_blank() {
            return Cow::Borrowed(line.text);
        }

        if self.in_literal_block {
            if line.indent > self.literal_block_base_indent {
                return Cow::Borrowed(line.text);
            }
            // Dedent ends the block; the line itself is ordinary YAML.
            self.close_block();
        }

        if let Some(caps) = BLOCK_SCALAR_OPENER.captures(line.text) {
            self.open_block(line.indent);
            return Cow::Owned(format!("{}*{}*{}", &caps[1], &caps[2], &caps[3]));
        }

        if let Some(caps) = KEY_VALUE.captures(line.text) {
            let (indent, key, value) = (&caps[1], &caps[2], &caps[3]);
            return if value.is_empty() || value == "null" {
                Cow::Owned(format!("{indent}*{key}:*"))
            } else {
                Cow::Owned(format!("{indent}*{key}:* {value}"))
            };
        }

        if let Some(caps) = LIST_ITEM.captures(line.text) {
            return Cow::Owned(format!("{}`{}`", &caps[1], &caps[2]));
        }

        Cow::Borrowed(line.text)
    }
}

/// Annotate a whole YAML document.
///
/// Lines are split on `\n` and joined back the same way, so a trailing
/// newline in the input is kept in the output.
pub fn annotate(document: &str) -> String {
    let mut state = AnnotatorState::new();
    document
        .split('\n')
        .map(|text| state.annotate_line(RawLine::new(text)))
        .collect::<Vec<_>>()
        .join("\n")
}

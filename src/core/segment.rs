//! # Response Segmentation
//!
//! Turns a raw assistant reply into an ordered list of typed [`Segment`]s.
//!
//! ```text
//! raw reply
//!   │
//!   ├─ 1. first ```yaml … ``` block   → ConfigBlock   (block removed from working text)
//!   ├─ 2. trimmed remainder, per line → TextLine*     (empty lines kept)
//!   └─ 3. first <a href='…'>…</a>     → Link          (scanned on the ORIGINAL text)
//! ```
//!
//! The output order is always `ConfigBlock?, TextLine*, Link?`, regardless of
//! where the pieces sat in the raw string. Nothing here can fail: a pattern
//! that doesn't match just contributes no segment.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language tag that marks a fenced block as configuration.
pub const CONFIG_LANGUAGE: &str = "yaml";

static CONFIG_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```yaml([\s\S]*?)```").expect("config block pattern is valid")
});

// `.` never crosses a line break, so an anchor split over lines is not a link.
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href=(?:'([^'\n]*)'|"([^"\n]*)")[^>\n]*>(.*?)</a>"#)
        .expect("link pattern is valid")
});

/// One renderable unit of an assistant reply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Inner text of the fenced configuration block, markers and tag excluded.
    ConfigBlock { content: String },
    /// A single line of prose. May be empty.
    TextLine { content: String },
    /// The first hyperlink found in the reply.
    Link { url: String, label: String },
}

impl Segment {
    /// Plain-text form of the segment, without any block or link formatting.
    pub fn plain_text(&self) -> &str {
        match self {
            Segment::ConfigBlock { content } | Segment::TextLine { content } => content,
            Segment::Link { label, .. } => label,
        }
    }
}

/// A hyperlink extracted from raw reply text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch<'a> {
    pub url: &'a str,
    pub label: &'a str,
}

/// Finds the first hyperlink in `raw`. Later anchors are ignored.
pub fn find_link(raw: &str) -> Option<LinkMatch<'_>> {
    let caps = LINK.captures(raw)?;
    let url = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let label = caps.get(3)?.as_str();
    Some(LinkMatch { url, label })
}

/// Whether `raw` carries a hyperlink. A reply with a link completes the session.
pub fn contains_link(raw: &str) -> bool {
    LINK.is_match(raw)
}

/// Parses a raw reply into segments.
pub fn parse(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();

    let working = match CONFIG_BLOCK.captures(raw) {
        Some(caps) => {
            let content = caps.get(1).map_or("", |m| m.as_str());
            segments.push(Segment::ConfigBlock {
                content: content.to_string(),
            });
            // Only the first block is lifted out; `replace` (not `replace_all`) mirrors that.
            CONFIG_BLOCK.replace(raw, "")
        }
        None => raw.into(),
    };

    let text = working.trim();
    if !text.is_empty() {
        segments.extend(text.lines().map(|line| Segment::TextLine {
            content: line.to_string(),
        }));
    }

    if let Some(link) = find_link(raw) {
        segments.push(Segment::Link {
            url: link.url.to_string(),
            label: link.label.to_string(),
        });
    }

    segments
}

//! Options threaded through reading and rendering.

use chrono::{DateTime, Utc};

use crate::ItalicMarker;

/// Options for reading payloads and resolving layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Fail on schema drift instead of substituting and warning.
    pub strict: bool,
    /// Ignore `truncate_after` and show every block.
    pub unroll: bool,
}

impl ReadOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn unrolled() -> Self {
        Self {
            unroll: true,
            ..Self::default()
        }
    }
}

/// Options for HTML output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Instant polls are compared against to decide whether voting closed.
    pub now: DateTime<Utc>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self { now: Utc::now() }
    }
}

impl HtmlOptions {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

/// Options for Markdown output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Replace media with short textual placeholders such as `(image)`.
    pub placeholders: bool,
    /// Omit the placeholder of a media kind that occurs only once in a post.
    pub skip_single_placeholders: bool,
    pub italic: ItalicMarker,
}

impl MarkdownOptions {
    pub fn placeholders() -> Self {
        Self {
            placeholders: true,
            ..Self::default()
        }
    }
}

//! Inline formatting ranges and the engine that applies them to text.
//!
//! A text block carries a flat string plus a list of `(start, end, kind)`
//! ranges measured in codepoints of the original text. Applying them means
//! inserting an opening marker at `start` and a closing marker at `end`.
//! For HTML the text is escaped first, and every range is shifted by the
//! growth the escaping caused before its offsets.

use std::collections::{BTreeMap, BTreeSet};

use crate::EmitError;

/// A blog referenced by a mention range.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MentionedBlog {
    pub name: String,
    pub url: Option<String>,
    pub uuid: Option<String>,
}

impl MentionedBlog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            uuid: None,
        }
    }

    /// Set the blog URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The blog URL, derived from the name when the payload omitted it.
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("https://{}.tumblr.com/", self.name),
        }
    }
}

/// What a formatting range does.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FormattingKind {
    Bold,
    Italic,
    Small,
    Strikethrough,
    Underline,
    /// Hyperlink to an arbitrary URL.
    Link { url: String },
    /// Mention of another blog.
    Mention { blog: MentionedBlog },
    /// Text color, as the upstream hex string (e.g. `#ff4930`).
    Color { hex: String },
    /// A kind this crate does not know yet. Markdown falls back to a generic
    /// marker; HTML refuses to render it.
    Other(String),
}

impl FormattingKind {
    /// The upstream name of this kind.
    pub fn name(&self) -> &str {
        match self {
            FormattingKind::Bold => "bold",
            FormattingKind::Italic => "italic",
            FormattingKind::Small => "small",
            FormattingKind::Strikethrough => "strikethrough",
            FormattingKind::Underline => "underline",
            FormattingKind::Link { .. } => "link",
            FormattingKind::Mention { .. } => "mention",
            FormattingKind::Color { .. } => "color",
            FormattingKind::Other(name) => name,
        }
    }
}

/// A formatting range over codepoint offsets of the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FormattingRange {
    pub start: usize,
    pub end: usize,
    pub kind: FormattingKind,
}

impl FormattingRange {
    pub fn new(start: usize, end: usize, kind: FormattingKind) -> Self {
        Self { start, end, kind }
    }
}

/// Marker used for italic ranges in Markdown output.
///
/// The default aliases italic to bold (`**`), which is what chat clients
/// rendering the embed expect. `Single` emits conventional `*`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ItalicMarker {
    #[default]
    Bold,
    Single,
}

/// Output flavour for [`apply_formatting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Html,
    Markdown(ItalicMarker),
}

struct Marker {
    start: usize,
    end: usize,
    open: String,
    close: String,
}

/// Apply formatting ranges to `text`.
///
/// For [`Target::Html`] the text is HTML-escaped and unknown kinds fail with
/// [`EmitError::UnsupportedFormattingKind`]. Markers that land on the same
/// offset are emitted in the order their ranges were declared; crossing
/// ranges produce crossing tags.
pub fn apply_formatting(
    text: &str,
    ranges: &[FormattingRange],
    target: Target,
    placeholders: bool,
) -> Result<String, EmitError> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut markers = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (open, close) = match target {
            Target::Html => html_markers(&range.kind)?,
            Target::Markdown(italic) => markdown_markers(&range.kind, italic, placeholders),
        };
        let end = range.end.min(len);
        let start = range.start.min(end);
        markers.push(Marker {
            start,
            end,
            open,
            close,
        });
    }

    let body = match target {
        Target::Html => escape_with_drift(&chars, &mut markers),
        Target::Markdown(_) => chars,
    };

    Ok(merge_insertions(&body, &markers))
}

fn html_markers(kind: &FormattingKind) -> Result<(String, String), EmitError> {
    let pair = match kind {
        FormattingKind::Bold => ("<b>".to_string(), "</b>".to_string()),
        FormattingKind::Italic => ("<i>".to_string(), "</i>".to_string()),
        FormattingKind::Small => ("<small>".to_string(), "</small>".to_string()),
        FormattingKind::Strikethrough => ("<strike>".to_string(), "</strike>".to_string()),
        FormattingKind::Underline => (
            "<span style=\"text-decoration:underline\">".to_string(),
            "</span>".to_string(),
        ),
        FormattingKind::Link { url } => (
            format!("<a href=\"{}\">", escape_attr(url)),
            "</a>".to_string(),
        ),
        FormattingKind::Mention { blog } => (
            format!("<a class=\"tumblelog\" href=\"{}\">", escape_attr(&blog.url())),
            "</a>".to_string(),
        ),
        FormattingKind::Color { hex } => match css_hex_color(hex) {
            Some(color) => (
                format!("<span style=\"color:{color}\">"),
                "</span>".to_string(),
            ),
            None => ("<span>".to_string(), "</span>".to_string()),
        },
        FormattingKind::Other(name) => {
            tracing::error!(kind = %name, "unsupported formatting kind in HTML output");
            return Err(EmitError::UnsupportedFormattingKind(name.clone()));
        }
    };
    Ok(pair)
}

fn markdown_markers(
    kind: &FormattingKind,
    italic: ItalicMarker,
    placeholders: bool,
) -> (String, String) {
    let (open, close) = match kind {
        FormattingKind::Bold => ("**".to_string(), "**".to_string()),
        FormattingKind::Italic => match italic {
            ItalicMarker::Bold => ("**".to_string(), "**".to_string()),
            ItalicMarker::Single => ("*".to_string(), "*".to_string()),
        },
        FormattingKind::Strikethrough => ("~".to_string(), "~".to_string()),
        FormattingKind::Small => ("_".to_string(), "_".to_string()),
        FormattingKind::Link { url } => ("[".to_string(), format!("]({url})")),
        FormattingKind::Mention { .. } if placeholders => ("[".to_string(), "]".to_string()),
        FormattingKind::Mention { blog } => ("[".to_string(), format!("]({})", blog.url())),
        _ => ("*".to_string(), "*".to_string()),
    };
    (open, close)
}

/// Normalise a color to `#rrggbb`-style CSS, rejecting anything that is not hex.
fn css_hex_color(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let valid = matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit());
    valid.then(|| format!("#{}", digits.to_ascii_lowercase()))
}

/// Escape `chars` for HTML text, shifting marker offsets past each expansion.
fn escape_with_drift(chars: &[char], markers: &mut [Marker]) -> Vec<char> {
    let original: Vec<(usize, usize)> = markers.iter().map(|m| (m.start, m.end)).collect();
    let mut out = Vec::with_capacity(chars.len());

    for (cursor, &c) in chars.iter().enumerate() {
        let Some(entity) = html_entity(c) else {
            out.push(c);
            continue;
        };
        out.extend(entity.chars());
        let drift = entity.len() - 1;
        for (marker, &(start, end)) in markers.iter_mut().zip(&original) {
            if start > cursor {
                marker.start += drift;
            }
            if end > cursor {
                marker.end += drift;
            }
        }
    }

    out
}

fn merge_insertions(body: &[char], markers: &[Marker]) -> String {
    let mut inserts: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for marker in markers {
        inserts.entry(marker.start).or_default().push(&marker.open);
        inserts.entry(marker.end).or_default().push(&marker.close);
    }

    let mut breaks: BTreeSet<usize> = inserts.keys().copied().collect();
    breaks.insert(0);
    breaks.insert(body.len());
    let breaks: Vec<usize> = breaks.into_iter().collect();

    let mut out = String::with_capacity(body.len() + markers.len() * 8);
    for (i, &offset) in breaks.iter().enumerate() {
        if let Some(strings) = inserts.get(&offset) {
            for s in strings {
                out.push_str(s);
            }
        }
        if let Some(&next) = breaks.get(i + 1) {
            out.extend(&body[offset..next]);
        }
    }
    out
}

fn html_entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    }
}

/// Escape HTML special characters.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match html_entity(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    result
}

/// Escape attribute values.
pub fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

//! Content blocks.
//!
//! A post's content is a flat array of blocks. Layouts refer to blocks by
//! their position in that array, so the array itself is never reordered.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::{FormattingRange, MAX_INDENT_DEPTH, MediaList};

/// Text used for blocks whose type this crate cannot render.
pub const UNIMPLEMENTED_BLOCK_TEXT: &str = "(Unimplemented block; click to see the full post)";

/// One unit of post content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
    Video(VideoBlock),
    Audio(AudioBlock),
    Link(LinkBlock),
    Poll(PollBlock),
    /// Synthetic marker appended when a layout truncates the post.
    ReadMore,
    /// Synthetic marker appended to submitted posts.
    Submission(SubmissionBlock),
}

impl Block {
    /// The upstream type name of this block.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Text(_) => "text",
            Block::Image(_) => "image",
            Block::Video(_) => "video",
            Block::Audio(_) => "audio",
            Block::Link(_) => "link",
            Block::Poll(_) => "poll",
            Block::ReadMore => "read_more",
            Block::Submission(_) => "submission",
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text subtype, `Subtype::None` for every non-text block.
    pub fn subtype(&self) -> Subtype {
        self.as_text().map(|t| t.subtype).unwrap_or_default()
    }

    /// Indentation depth, 0 for every non-text block.
    pub fn indent_level(&self) -> u32 {
        self.as_text().map(|t| t.indent_level).unwrap_or(0)
    }

    /// Whether the block was synthesized rather than read from the payload.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Block::ReadMore | Block::Submission(_))
    }
}

/// Text block subtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Subtype {
    #[default]
    None,
    Heading1,
    Heading2,
    OrderedListItem,
    UnorderedListItem,
    Indented,
    Quote,
    Chat,
    Quirky,
}

impl Subtype {
    /// Parse an upstream subtype name.
    pub fn from_name(name: &str) -> Option<Self> {
        let subtype = match name {
            "heading1" => Subtype::Heading1,
            "heading2" => Subtype::Heading2,
            "ordered-list-item" => Subtype::OrderedListItem,
            "unordered-list-item" => Subtype::UnorderedListItem,
            "indented" => Subtype::Indented,
            "quote" => Subtype::Quote,
            "chat" => Subtype::Chat,
            "quirky" => Subtype::Quirky,
            _ => return None,
        };
        Some(subtype)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Subtype::None => "no_subtype",
            Subtype::Heading1 => "heading1",
            Subtype::Heading2 => "heading2",
            Subtype::OrderedListItem => "ordered-list-item",
            Subtype::UnorderedListItem => "unordered-list-item",
            Subtype::Indented => "indented",
            Subtype::Quote => "quote",
            Subtype::Chat => "chat",
            Subtype::Quirky => "quirky",
        }
    }

    /// HTML element that must wrap consecutive blocks of this subtype.
    pub fn wrapper_tag(&self) -> Option<&'static str> {
        match self {
            Subtype::OrderedListItem => Some("ol"),
            Subtype::UnorderedListItem => Some("ul"),
            Subtype::Indented => Some("blockquote"),
            _ => None,
        }
    }
}

/// A paragraph of text with inline formatting.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextBlock {
    pub text: String,
    pub subtype: Subtype,
    pub indent_level: u32,
    pub formatting: Vec<FormattingRange>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// The block substituted for unknown block types.
    pub fn placeholder() -> Self {
        Self::new(UNIMPLEMENTED_BLOCK_TEXT)
    }

    /// Set the subtype.
    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtype = subtype;
        self
    }

    /// Set the indent level.
    pub fn with_indent(mut self, indent_level: u32) -> Self {
        self.indent_level = indent_level;
        self
    }

    /// Append a formatting range.
    pub fn with_formatting(mut self, range: FormattingRange) -> Self {
        self.formatting.push(range);
        self
    }

    /// Whether the block needs more than plain-text rendering.
    pub fn is_rich(&self) -> bool {
        !self.formatting.is_empty() || self.subtype != Subtype::None
    }

    /// Indent level as rendered, capped so nesting never exceeds
    /// [`MAX_INDENT_DEPTH`].
    pub fn rendered_indent(&self) -> usize {
        usize::try_from(self.indent_level)
            .unwrap_or(usize::MAX)
            .min(MAX_INDENT_DEPTH - 1)
    }
}

/// An image with its renditions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageBlock {
    pub media: MediaList,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
}

impl ImageBlock {
    pub fn new(media: MediaList) -> Self {
        Self {
            media,
            alt_text: None,
            caption: None,
        }
    }

    /// Set the alt text.
    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    pub fn is_gif(&self) -> bool {
        self.media.iter().any(|m| m.is_gif())
    }
}

/// A video, either hosted upstream (`media`) or embedded from a provider.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VideoBlock {
    pub provider: Option<String>,
    pub url: Option<String>,
    pub media: Option<MediaList>,
    pub poster: Option<MediaList>,
    pub embed_html: Option<String>,
    pub embed_url: Option<String>,
}

impl VideoBlock {
    /// Whether the video comes from a third-party embed rather than a file.
    pub fn is_embed(&self) -> bool {
        self.media.is_none()
    }
}

/// An audio track, hosted upstream or embedded.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AudioBlock {
    pub provider: Option<String>,
    pub url: Option<String>,
    pub media: Option<MediaList>,
    pub poster: Option<MediaList>,
    pub embed_html: Option<String>,
    pub embed_url: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl AudioBlock {
    pub fn is_embed(&self) -> bool {
        self.media.is_none()
    }
}

/// A link card.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkBlock {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub display_url: Option<String>,
    pub poster: Option<MediaList>,
}

impl LinkBlock {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Title to show: the title, else the display URL, else the URL.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.display_url.as_deref().filter(|u| !u.is_empty()))
            .unwrap_or(&self.url)
    }
}

/// A poll, optionally merged with its vote counts.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PollBlock {
    pub client_id: String,
    pub question: String,
    pub answers: Vec<PollAnswer>,
    /// Seconds after `created_at` at which voting closes.
    pub expire_after: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub results: Option<PollResults>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PollAnswer {
    pub client_id: String,
    pub answer_text: String,
}

/// Vote counts keyed by answer client id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PollResults {
    pub votes: BTreeMap<String, u64>,
}

impl PollResults {
    pub fn votes_for(&self, answer_id: &str) -> u64 {
        self.votes.get(answer_id).copied().unwrap_or(0)
    }
}

impl PollBlock {
    /// When voting closes, if both the creation time and duration are known.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let created_at = self.created_at?;
        let seconds = i64::try_from(self.expire_after?).ok()?;
        created_at.checked_add_signed(Duration::try_seconds(seconds)?)
    }

    /// Whether voting has closed at `now`. Unknown expiry counts as open.
    pub fn is_over(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expiry| expiry <= now)
    }

    /// Total votes over this poll's answers, if results are known.
    pub fn total_votes(&self) -> Option<u64> {
        let results = self.results.as_ref()?;
        Some(self.answers.iter().map(|a| results.votes_for(&a.client_id)).sum())
    }

    /// Highest vote count over this poll's answers, if results are known.
    pub fn most_votes(&self) -> Option<u64> {
        let results = self.results.as_ref()?;
        self.answers
            .iter()
            .map(|a| results.votes_for(&a.client_id))
            .max()
    }
}

/// Synthetic notice naming who submitted the post.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubmissionBlock {
    pub submitted_by: String,
}

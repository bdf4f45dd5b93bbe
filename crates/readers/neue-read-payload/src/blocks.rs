//! Content block parsing.

use chrono::{DateTime, Utc};
use neue_core::{
    AudioBlock, Block, FormattingKind, FormattingRange, ImageBlock, LinkBlock, Media, MediaList,
    MentionedBlog, ParseError, PollAnswer, PollBlock, PollResults, Severity, Subtype, TextBlock,
    VideoBlock, WarningKind,
};
use serde::Deserialize;
use serde_json::Value;

use crate::Reader;
use crate::source::vote_counts;

#[derive(Debug, Deserialize)]
struct WireMedia {
    url: String,
    #[serde(rename = "type", default)]
    mime_type: Option<String>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    has_original_dimensions: bool,
}

impl From<WireMedia> for Media {
    fn from(wire: WireMedia) -> Self {
        Media {
            url: wire.url,
            mime_type: wire.mime_type,
            width: wire.width,
            height: wire.height,
            has_original_dimensions: wire.has_original_dimensions,
        }
    }
}

/// Video and audio `media` is a single object; images use a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireMediaField {
    Many(Vec<WireMedia>),
    One(WireMedia),
}

impl From<WireMediaField> for MediaList {
    fn from(field: WireMediaField) -> Self {
        match field {
            WireMediaField::Many(list) => list.into_iter().map(Media::from).collect::<Vec<_>>(),
            WireMediaField::One(media) => vec![media.into()],
        }
        .into()
    }
}

#[derive(Debug, Deserialize)]
struct WireFormatting {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    blog: Option<WireBlogRef>,
    #[serde(default)]
    hex: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireBlogRef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAnswer {
    client_id: String,
    answer_text: String,
}

/// Where a block lives, for poll result lookups and messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockContext<'p> {
    pub blog_name: &'p str,
    pub post_id: &'p str,
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

impl Reader<'_> {
    pub(crate) fn parse_block(
        &mut self,
        value: &Value,
        context: BlockContext<'_>,
    ) -> Result<Block, ParseError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::missing("type", "content block"))?;

        match kind {
            "text" => self.parse_text(value).map(Block::Text),
            "image" => self.parse_image(value).map(Block::Image),
            "video" => self.parse_video(value).map(Block::Video),
            "audio" => self.parse_audio(value).map(Block::Audio),
            "link" => self.parse_link(value).map(Block::Link),
            "poll" => self.parse_poll(value, context).map(Block::Poll),
            other => {
                if self.options.strict {
                    return Err(ParseError::UnimplementedBlockKind(other.to_string()));
                }
                self.warn(
                    Severity::Major,
                    WarningKind::UnimplementedBlock(other.to_string()),
                    format!(
                        "unimplemented block type `{other}` in {}/{}, substituting placeholder",
                        context.blog_name, context.post_id
                    ),
                );
                Ok(Block::Text(TextBlock::placeholder()))
            }
        }
    }

    fn parse_text(&mut self, value: &Value) -> Result<TextBlock, ParseError> {
        let text = value
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::missing("text", "text block"))?;

        let subtype = match value.get("subtype").and_then(Value::as_str) {
            None => Subtype::None,
            Some(name) => Subtype::from_name(name).unwrap_or_else(|| {
                self.warn(
                    Severity::Minor,
                    WarningKind::UnknownSubtype(name.to_string()),
                    format!("unknown text subtype `{name}`, rendering as plain text"),
                );
                Subtype::None
            }),
        };

        let indent_level = value
            .get("indent_level")
            .and_then(Value::as_u64)
            .and_then(|level| u32::try_from(level).ok())
            .unwrap_or(0);

        let mut formatting = Vec::new();
        if let Some(ranges) = value.get("formatting").and_then(Value::as_array) {
            for range in ranges {
                if let Some(range) = self.parse_formatting(range)? {
                    formatting.push(range);
                }
            }
        }

        Ok(TextBlock {
            text: text.to_string(),
            subtype,
            indent_level,
            formatting,
        })
    }

    fn parse_formatting(&mut self, value: &Value) -> Result<Option<FormattingRange>, ParseError> {
        let wire = match WireFormatting::deserialize(value) {
            Ok(wire) => wire,
            Err(e) => {
                if self.options.strict {
                    return Err(ParseError::MalformedPayload(format!(
                        "invalid formatting range: {e}"
                    )));
                }
                self.ignore("formatting", format!("invalid formatting range: {e}"));
                return Ok(None);
            }
        };

        let kind = match wire.kind.as_str() {
            "bold" => FormattingKind::Bold,
            "italic" => FormattingKind::Italic,
            "small" => FormattingKind::Small,
            "strikethrough" => FormattingKind::Strikethrough,
            "underline" => FormattingKind::Underline,
            "link" => match wire.url {
                Some(url) => FormattingKind::Link { url },
                None => return self.incomplete_range("url", "link"),
            },
            "mention" => match wire.blog {
                Some(WireBlogRef {
                    name: Some(name),
                    url,
                    uuid,
                }) => FormattingKind::Mention {
                    blog: MentionedBlog { name, url, uuid },
                },
                _ => return self.incomplete_range("blog", "mention"),
            },
            "color" => match wire.hex {
                Some(hex) => FormattingKind::Color { hex },
                None => return self.incomplete_range("hex", "color"),
            },
            other => {
                self.warn(
                    Severity::Major,
                    WarningKind::UnknownFormatting(other.to_string()),
                    format!("unknown formatting type `{other}`"),
                );
                FormattingKind::Other(other.to_string())
            }
        };

        let (start, end) = if wire.start <= wire.end {
            (wire.start, wire.end)
        } else {
            (wire.end, wire.start)
        };
        Ok(Some(FormattingRange::new(start, end, kind)))
    }

    fn incomplete_range(
        &mut self,
        field: &'static str,
        kind: &str,
    ) -> Result<Option<FormattingRange>, ParseError> {
        if self.options.strict {
            return Err(ParseError::missing(field, format!("{kind} formatting")));
        }
        self.ignore("formatting", format!("{kind} formatting without `{field}`, dropped"));
        Ok(None)
    }

    fn media_field(&mut self, value: &Value, key: &str) -> Option<MediaList> {
        let field = value.get(key)?;
        match WireMediaField::deserialize(field) {
            Ok(media) => Some(media.into()).filter(|list: &MediaList| !list.is_empty()),
            Err(e) => {
                self.ignore(key, format!("invalid `{key}` media: {e}"));
                None
            }
        }
    }

    fn parse_image(&mut self, value: &Value) -> Result<ImageBlock, ParseError> {
        let media = self
            .media_field(value, "media")
            .ok_or_else(|| ParseError::missing("media", "image block"))?;
        Ok(ImageBlock {
            media,
            alt_text: str_field(value, "alt_text"),
            caption: str_field(value, "caption"),
        })
    }

    fn parse_video(&mut self, value: &Value) -> Result<VideoBlock, ParseError> {
        let block = VideoBlock {
            provider: str_field(value, "provider"),
            url: str_field(value, "url"),
            media: self.media_field(value, "media"),
            poster: self.media_field(value, "poster"),
            embed_html: str_field(value, "embed_html"),
            embed_url: str_field(value, "embed_url"),
        };
        if block.media.is_none() && block.embed_html.is_none() {
            return Err(ParseError::missing("media", "video block without embed_html"));
        }
        Ok(block)
    }

    fn parse_audio(&mut self, value: &Value) -> Result<AudioBlock, ParseError> {
        let block = AudioBlock {
            provider: str_field(value, "provider"),
            url: str_field(value, "url"),
            media: self.media_field(value, "media"),
            poster: self.media_field(value, "poster"),
            embed_html: str_field(value, "embed_html"),
            embed_url: str_field(value, "embed_url"),
            title: str_field(value, "title"),
            artist: str_field(value, "artist"),
            album: str_field(value, "album"),
        };
        if block.media.is_none() && block.embed_html.is_none() {
            return Err(ParseError::missing("media", "audio block without embed_html"));
        }
        Ok(block)
    }

    fn parse_link(&mut self, value: &Value) -> Result<LinkBlock, ParseError> {
        let url = str_field(value, "url").ok_or_else(|| ParseError::missing("url", "link block"))?;
        Ok(LinkBlock {
            url,
            title: str_field(value, "title"),
            description: str_field(value, "description"),
            author: str_field(value, "author"),
            site_name: str_field(value, "site_name"),
            display_url: str_field(value, "display_url"),
            poster: self.media_field(value, "poster"),
        })
    }

    fn parse_poll(
        &mut self,
        value: &Value,
        context: BlockContext<'_>,
    ) -> Result<PollBlock, ParseError> {
        let question =
            str_field(value, "question").ok_or_else(|| ParseError::missing("question", "poll block"))?;
        let client_id = str_field(value, "client_id").unwrap_or_default();

        let answers = match value.get("answers") {
            None => Vec::new(),
            Some(answers) => Vec::<WireAnswer>::deserialize(answers)
                .map_err(|e| ParseError::MalformedPayload(format!("invalid poll answers: {e}")))?
                .into_iter()
                .map(|a| PollAnswer {
                    client_id: a.client_id,
                    answer_text: a.answer_text,
                })
                .collect(),
        };

        let expire_after = value
            .pointer("/settings/expire_after")
            .and_then(Value::as_u64);
        let created_at = match value.get("created_at") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() {
                    self.ignore("created_at", format!("unreadable poll created_at: {raw}"));
                }
                parsed
            }
        };

        let results = if client_id.is_empty() {
            None
        } else {
            self.polls
                .and_then(|polls| {
                    polls.poll_results(context.blog_name, context.post_id, &client_id, value)
                })
                .and_then(|payload| vote_counts(&payload))
                .map(|votes| PollResults { votes })
        };
        tracing::debug!(
            poll = %client_id,
            has_results = results.is_some(),
            "read poll block"
        );

        Ok(PollBlock {
            client_id,
            question,
            answers,
            expire_after,
            created_at,
            results,
        })
    }
}

/// Parse an RFC 3339 string or integer Unix seconds.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
        _ => None,
    }
}

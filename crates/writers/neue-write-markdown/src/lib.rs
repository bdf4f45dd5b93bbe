//! Markdown writer for neue.
//!
//! Produces the flattened, chat-client flavoured Markdown used in link
//! previews. Wrapper annotations are ignored here: list and quote structure is
//! expressed with line prefixes instead.

use neue_core::formatting::apply_formatting;
use neue_core::{
    AnnotatedBlock, AudioBlock, Block, EmitError, ImageBlock, MarkdownOptions, PollBlock, Subtype,
    Target, TextBlock, VideoBlock,
};

/// Rendition width used for image links.
pub const IMAGE_WIDTH: u32 = 640;

/// Emit an annotated block sequence with default options.
pub fn emit(blocks: &[AnnotatedBlock<'_>]) -> Result<String, EmitError> {
    emit_with_options(blocks, &MarkdownOptions::default())
}

/// Emit an annotated block sequence, one block per line.
///
/// Leading ask blocks are introduced by an `{asker} asked:` line.
pub fn emit_with_options(
    blocks: &[AnnotatedBlock<'_>],
    options: &MarkdownOptions,
) -> Result<String, EmitError> {
    let mut ctx = EmitContext::new(options, MediaCounts::of(blocks.iter().map(|b| b.block.as_ref())));

    if let Some(first) = blocks.first().filter(|b| b.is_ask) {
        let asker = first
            .ask_attribution
            .as_ref()
            .map_or("Anonymous", |a| a.blog_name.as_str());
        ctx.lines.push(format!("{asker} asked:"));
    }

    for block in blocks {
        ctx.emit_block(&block.block)?;
    }

    Ok(ctx.lines.join("\n"))
}

/// Emit a single block.
pub fn emit_block(block: &Block, options: &MarkdownOptions) -> Result<String, EmitError> {
    let mut ctx = EmitContext::new(options, MediaCounts::of(std::iter::once(block)));
    ctx.emit_block(block)?;
    Ok(ctx.lines.join("\n"))
}

/// How many media blocks of each kind a post has.
#[derive(Debug, Default, Clone, Copy)]
struct MediaCounts {
    images: usize,
    videos: usize,
    audio: usize,
}

impl MediaCounts {
    fn of<'b>(blocks: impl Iterator<Item = &'b Block>) -> Self {
        let mut counts = Self::default();
        for block in blocks {
            match block {
                Block::Image(_) => counts.images += 1,
                Block::Video(_) => counts.videos += 1,
                Block::Audio(_) => counts.audio += 1,
                _ => {}
            }
        }
        counts
    }
}

struct EmitContext<'o> {
    options: &'o MarkdownOptions,
    counts: MediaCounts,
    lines: Vec<String>,
    /// Next number per nesting level of the current ordered list run.
    ordered: Vec<u32>,
}

impl<'o> EmitContext<'o> {
    fn new(options: &'o MarkdownOptions, counts: MediaCounts) -> Self {
        Self {
            options,
            counts,
            lines: Vec::new(),
            ordered: Vec::new(),
        }
    }

    /// Whether a placeholder for a kind seen `count` times should be dropped.
    fn skip_placeholder(&self, count: usize) -> bool {
        self.options.placeholders && self.options.skip_single_placeholders && count == 1
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn emit_block(&mut self, block: &Block) -> Result<(), EmitError> {
        match block {
            Block::Text(text) => {
                self.track_list(text);
                let line = self.text(text)?;
                self.push(line);
                return Ok(());
            }
            Block::Image(image) => {
                if !self.skip_placeholder(self.counts.images) {
                    let line = self.image(image);
                    self.push(line);
                }
            }
            Block::Video(video) => {
                if !self.skip_placeholder(self.counts.videos) {
                    let line = self.video(video);
                    self.push(line);
                }
            }
            Block::Audio(audio) => {
                if !self.skip_placeholder(self.counts.audio) {
                    let line = self.audio(audio);
                    self.push(line);
                }
            }
            Block::Link(link) => self.push(format!("[{}]({})", link.display_title(), link.url)),
            Block::Poll(poll) => {
                let line = poll_markdown(poll);
                self.push(line);
            }
            Block::ReadMore => self.push("(keep reading)".to_string()),
            // Submissions are credited once for the whole thread.
            Block::Submission(_) => {}
        }
        self.ordered.clear();
        Ok(())
    }

    /// Update ordered-list counters for a text block.
    fn track_list(&mut self, block: &TextBlock) {
        let level = block.rendered_indent();
        match block.subtype {
            Subtype::OrderedListItem => {
                self.ordered.truncate(level + 1);
                self.ordered.resize(level + 1, 0);
                self.ordered[level] += 1;
            }
            Subtype::UnorderedListItem => self.ordered.truncate(level),
            _ => self.ordered.clear(),
        }
    }

    fn text(&self, block: &TextBlock) -> Result<String, EmitError> {
        let body = apply_formatting(
            &block.text,
            &block.formatting,
            Target::Markdown(self.options.italic),
            self.options.placeholders,
        )?;
        let depth = block.rendered_indent();
        let indent = "  ".repeat(depth);

        let line = match block.subtype {
            Subtype::None => body,
            Subtype::Heading1 => format!("# {body}"),
            Subtype::Heading2 => format!("## {body}"),
            Subtype::OrderedListItem => {
                let n = self.ordered.last().copied().unwrap_or(1);
                format!("{indent}{n}. {body}")
            }
            Subtype::UnorderedListItem => format!("{indent}- {body}"),
            Subtype::Indented => prefix_lines(&body, &"> ".repeat(depth + 1)),
            Subtype::Quote => prefix_lines(&body, "> "),
            Subtype::Chat => format!("`{body}`"),
            Subtype::Quirky => format!("*{body}*"),
        };
        Ok(line)
    }

    fn image(&self, block: &ImageBlock) -> String {
        if self.options.placeholders {
            return "(image)".to_string();
        }
        match block.media.pick_one_size(IMAGE_WIDTH) {
            Some(media) => format!("![Image]({})", media.url),
            None => "(image)".to_string(),
        }
    }

    fn video(&self, block: &VideoBlock) -> String {
        if self.options.placeholders {
            return if block.is_embed() {
                "(video embed)".to_string()
            } else {
                "(video)".to_string()
            };
        }
        if let Some(embed) = &block.embed_html {
            return embed.clone();
        }
        match block.poster.as_ref().and_then(|p| p.pick_one_size(IMAGE_WIDTH)) {
            Some(poster) => format!("![Video]({})", poster.url),
            None => "(video)".to_string(),
        }
    }

    fn audio(&self, block: &AudioBlock) -> String {
        if self.options.placeholders {
            return "(audio)".to_string();
        }
        match &block.embed_html {
            Some(embed) => embed.clone(),
            None => "(audio)".to_string(),
        }
    }
}

fn poll_markdown(poll: &PollBlock) -> String {
    let mut out = poll.question.clone();
    for answer in &poll.answers {
        out.push_str("\n* ");
        out.push_str(&answer.answer_text);
    }
    out
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

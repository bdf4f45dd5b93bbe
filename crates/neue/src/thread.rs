//! Reblog threads: trail posts composed into one document.

use neue_core::formatting::{escape_attr, escape_html};
use neue_core::{
    AudioBlock, Block, HtmlOptions, ImageBlock, MarkdownOptions, Post, ReadOptions, Subtype,
    VideoBlock, Warning,
};
use neue_read_payload::{ParsedThread, PollResultsSource, PostSource};
use serde_json::Value;

use crate::Error;

/// A post and its reblog trail, oldest post first.
///
/// Built once from a payload and never mutated: every render call resolves
/// and annotates a fresh block sequence, so a thread can be rendered to HTML
/// and Markdown in any order.
#[derive(Debug, Clone)]
pub struct Thread {
    /// Trail posts, oldest first, then the requested post if it adds content.
    pub posts: Vec<Post>,
    /// Blog that published the requested post.
    pub blog_name: String,
    pub post_id: String,
    pub post_url: String,
    /// Unix seconds.
    pub timestamp: i64,
    /// Blog the requested post was reblogged from.
    pub reblogged_from: Option<String>,
    /// Blog that reblogged it, when the requested post is a reblog.
    pub reblogged_by: Option<String>,
    pub avatar_url: Option<String>,
    pub tags: Vec<String>,
    pub note_count: u64,
    pub is_submission: bool,
    pub submitted_by: Option<String>,
    pub thread_info: ThreadInfo,
    /// Schema drift recovered while reading and resolving.
    pub warnings: Vec<Warning>,
    options: ReadOptions,
}

impl Thread {
    /// Build a thread from a decoded payload.
    pub fn from_payload(payload: &Value, options: &ReadOptions) -> Result<Self, Error> {
        Self::from_payload_with(payload, options, None)
    }

    /// Build a thread from a decoded payload, merging poll results from `polls`.
    pub fn from_payload_with(
        payload: &Value,
        options: &ReadOptions,
        polls: Option<&dyn PollResultsSource>,
    ) -> Result<Self, Error> {
        let parsed = neue_read_payload::parse_value(payload, options, polls)?;
        Self::from_parsed(parsed.value, parsed.warnings, options)
    }

    /// Build a thread from a JSON string.
    pub fn from_json(input: &str, options: &ReadOptions) -> Result<Self, Error> {
        let parsed = neue_read_payload::parse_with_options(input, options)?;
        Self::from_parsed(parsed.value, parsed.warnings, options)
    }

    /// Fetch a post through `source` and build its thread.
    pub fn fetch(
        source: &dyn PostSource,
        blog_name: &str,
        post_id: &str,
        options: &ReadOptions,
        polls: Option<&dyn PollResultsSource>,
    ) -> Result<Self, Error> {
        let payload = source.fetch_post(blog_name, post_id)?;
        Self::from_payload_with(&payload, options, polls)
    }

    fn from_parsed(
        parsed: ParsedThread,
        mut warnings: Vec<Warning>,
        options: &ReadOptions,
    ) -> Result<Self, Error> {
        // Resolve once up front so layout problems surface at construction.
        for post in &parsed.posts {
            warnings.extend(neue_transforms::resolve_post(post, options)?.warnings);
        }

        let thread_info = ThreadInfo::scan(&parsed.posts, parsed.title);
        let reblogged_by = parsed
            .reblogged_from
            .as_ref()
            .map(|_| parsed.blog_name.clone());

        Ok(Self {
            posts: parsed.posts,
            blog_name: parsed.blog_name,
            post_id: parsed.post_id,
            post_url: parsed.post_url,
            timestamp: parsed.timestamp,
            reblogged_from: parsed.reblogged_from,
            reblogged_by,
            avatar_url: parsed.avatar_url,
            tags: parsed.tags,
            note_count: parsed.note_count,
            is_submission: parsed.is_submission,
            submitted_by: parsed.submitted_by,
            thread_info,
            warnings,
            options: *options,
        })
    }

    /// Options the thread was read with.
    pub fn read_options(&self) -> &ReadOptions {
        &self.options
    }

    /// Whether the requested post is a reblog.
    pub fn is_reblog(&self) -> bool {
        self.reblogged_from.is_some()
    }

    /// Name shown for a submission: the submitter, else the blog.
    pub fn submitter(&self) -> &str {
        self.submitted_by.as_deref().unwrap_or(&self.blog_name)
    }

    /// Render the whole thread as sanitized HTML.
    ///
    /// Each earlier post is quoted inside the next one:
    /// `<p><a href="{url}">{blog}</a>:</p><blockquote>{earlier}</blockquote>{post}`.
    pub fn to_html(&self, options: &HtmlOptions) -> Result<String, Error> {
        let mut posts = self.posts.iter();
        let Some(first) = posts.next() else {
            return Ok(String::new());
        };

        let mut html = self.post_to_html(first, options)?;
        let mut previous = first;
        for post in posts {
            let current = self.post_to_html(post, options)?;
            html = format!(
                "<p><a href=\"{}\">{}</a>:</p><blockquote>{html}</blockquote>{current}",
                escape_attr(&previous.post_url),
                escape_html(&previous.blog_name),
            );
            previous = post;
        }

        Ok(neue_sanitize::sanitize(&html))
    }

    /// Render the whole thread as Markdown, one `{blog}:` section per post.
    pub fn to_markdown(&self, options: &MarkdownOptions) -> Result<String, Error> {
        let mut sections = Vec::with_capacity(self.posts.len() + 1);
        for post in &self.posts {
            let body = self.post_to_markdown(post, options)?;
            sections.push(format!("{}:\n{body}", post.blog_name));
        }
        if self.is_submission {
            sections.push(format!("(Submitted by {})", self.submitter()));
        }
        Ok(sections.join("\n\n"))
    }

    /// Render one post as unsanitized HTML.
    pub fn post_to_html(&self, post: &Post, options: &HtmlOptions) -> Result<String, Error> {
        let blocks = neue_transforms::prepare(post, &self.options)?.value;
        Ok(neue_write_html::emit_with_options(&blocks, options)?)
    }

    /// Render one post as Markdown.
    pub fn post_to_markdown(
        &self,
        post: &Post,
        options: &MarkdownOptions,
    ) -> Result<String, Error> {
        let blocks = neue_transforms::prepare(post, &self.options)?.value;
        Ok(neue_write_markdown::emit_with_options(&blocks, options)?)
    }
}

/// Thread-wide aggregates used to decide how a post is embedded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadInfo {
    /// Legacy post title, else the first heading in the thread.
    pub title: Option<String>,
    pub images: Vec<ImageBlock>,
    pub videos: Vec<VideoBlock>,
    pub audio: Vec<AudioBlock>,
    /// Link and poll blocks.
    pub other_blocks: Vec<Block>,
    /// Any text block with formatting ranges or a subtype.
    pub has_formatting: bool,
}

impl ThreadInfo {
    /// Scan the raw, non-ask blocks of every post once.
    pub fn scan(posts: &[Post], title: Option<String>) -> Self {
        let mut info = Self {
            title,
            ..Self::default()
        };
        let mut heading = None;

        for block in posts.iter().flat_map(Post::non_ask_blocks) {
            match block {
                Block::Text(text) => {
                    info.has_formatting |= text.is_rich();
                    if heading.is_none()
                        && matches!(text.subtype, Subtype::Heading1 | Subtype::Heading2)
                        && !text.text.trim().is_empty()
                    {
                        heading = Some(text.text.clone());
                    }
                }
                Block::Image(image) => info.images.push(image.clone()),
                Block::Video(video) => info.videos.push(video.clone()),
                Block::Audio(audio) => info.audio.push(audio.clone()),
                Block::Link(_) | Block::Poll(_) | Block::ReadMore => {
                    info.other_blocks.push(block.clone())
                }
                Block::Submission(_) => {}
            }
        }

        if info.title.is_none() {
            info.title = heading;
        }
        info
    }

    /// Whether the thread carries any image, video or audio.
    pub fn has_media(&self) -> bool {
        !(self.images.is_empty() && self.videos.is_empty() && self.audio.is_empty())
    }
}

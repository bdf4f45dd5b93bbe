//! NPF payload reader for neue.
//!
//! Reads a post as returned by the upstream API (with `npf=true` and
//! `reblog_info=true`) into the neue block model: the reblog trail, oldest
//! first, followed by the post itself when it adds content.
//!
//! # Example
//!
//! ```ignore
//! use neue_read_payload::parse;
//!
//! let result = parse(payload_json)?;
//! for post in &result.value.posts {
//!     println!("{}: {} blocks", post.blog_name, post.content.len());
//! }
//! ```

mod blocks;
mod layout;
pub mod source;

pub use source::{
    AvatarSource, FetchError, PollResultsMap, PollResultsSource, PostSource, vote_counts,
};

use blocks::BlockContext;
use neue_core::{
    Block, ConversionResult, LayoutEntry, ParseError, Post, ReadOptions, Severity, Warning,
    WarningKind, post_url,
};
use serde_json::Value;

/// A post payload read into the block model, plus thread-level metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedThread {
    /// Trail posts, oldest first, then the requested post if it has content.
    pub posts: Vec<Post>,
    /// Blog that published the requested post.
    pub blog_name: String,
    pub post_id: String,
    pub post_url: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub reblogged_from: Option<String>,
    /// Legacy post title, when the payload still carries one.
    pub title: Option<String>,
    pub avatar_url: Option<String>,
    pub tags: Vec<String>,
    pub note_count: u64,
    pub is_submission: bool,
    pub submitted_by: Option<String>,
}

/// Parse a payload from a JSON string with default options.
pub fn parse(input: &str) -> Result<ConversionResult<ParsedThread>, ParseError> {
    parse_with_options(input, &ReadOptions::default())
}

/// Parse a payload from a JSON string.
pub fn parse_with_options(
    input: &str,
    options: &ReadOptions,
) -> Result<ConversionResult<ParsedThread>, ParseError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    parse_value(&value, options, None)
}

/// Parse an already-decoded payload, looking poll results up in `polls`.
pub fn parse_value(
    value: &Value,
    options: &ReadOptions,
    polls: Option<&dyn PollResultsSource>,
) -> Result<ConversionResult<ParsedThread>, ParseError> {
    let mut reader = Reader::new(*options, polls);
    let thread = reader.read_thread(value)?;
    Ok(ConversionResult::with_warnings(thread, reader.warnings))
}

/// Parse a single content block.
pub fn parse_block(value: &Value, options: &ReadOptions) -> Result<ConversionResult<Block>, ParseError> {
    let mut reader = Reader::new(*options, None);
    let context = BlockContext {
        blog_name: "",
        post_id: "",
    };
    let block = reader.parse_block(value, context)?;
    Ok(ConversionResult::with_warnings(block, reader.warnings))
}

/// Parse a layout array.
pub fn parse_layout(
    value: &Value,
    options: &ReadOptions,
) -> Result<ConversionResult<Vec<LayoutEntry>>, ParseError> {
    let mut reader = Reader::new(*options, None);
    let layout = reader.read_layout(value)?;
    Ok(ConversionResult::with_warnings(layout, reader.warnings))
}

pub(crate) struct Reader<'a> {
    options: ReadOptions,
    polls: Option<&'a dyn PollResultsSource>,
    warnings: Vec<Warning>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(options: ReadOptions, polls: Option<&'a dyn PollResultsSource>) -> Self {
        Self {
            options,
            polls,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, severity: Severity, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(Warning::new(severity, kind, message));
    }

    fn ignore(&mut self, field: &str, message: impl Into<String>) {
        self.warn(
            Severity::Minor,
            WarningKind::IgnoredField(field.to_string()),
            message,
        );
    }

    fn read_thread(&mut self, payload: &Value) -> Result<ParsedThread, ParseError> {
        // Accept the bare post as well as the API envelope.
        let (post, author_blog) = match payload.pointer("/response/posts/0") {
            Some(post) => (post, payload.pointer("/response/blog")),
            None => (payload, None),
        };
        if !post.is_object() {
            return Err(ParseError::MalformedPayload("post is not an object".to_string()));
        }
        let author_blog = post
            .get("_fx_author_blog")
            .or(author_blog)
            .or_else(|| post.get("blog"));

        let post_id = id_of(post)
            .ok_or_else(|| ParseError::MalformedPayload("missing `id`".to_string()))?;
        let timestamp = post
            .get("timestamp")
            .and_then(Value::as_i64)
            .ok_or_else(|| ParseError::MalformedPayload("missing `timestamp`".to_string()))?;
        let blog_name = top_level_blog_name(post)
            .ok_or_else(|| ParseError::MalformedPayload("missing blog name".to_string()))?;

        let mut posts = Vec::new();
        if let Some(trail) = post.get("trail").and_then(Value::as_array) {
            for item in trail {
                posts.push(self.read_trail_item(item)?);
            }
        }
        if let Some(root_name) = post.get("reblogged_root_name").and_then(Value::as_str)
            && let Some(root) = posts.first_mut()
        {
            root.blog_name = root_name.to_string();
            root.post_url = post_url(&root.blog_name, &root.post_id);
        }

        let tags: Vec<String> = post
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let is_submission = post
            .get("is_submission")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let submitted_by = str_of(post, "post_author");
        let url = str_of(post, "post_url").unwrap_or_else(|| post_url(&blog_name, &post_id));

        let content = self.read_content(post, &blog_name, &post_id)?;
        if !content.is_empty() {
            let layout = match post.get("layout") {
                Some(layout) => self.read_layout(layout)?,
                None => Vec::new(),
            };
            posts.push(Post {
                blog_name: blog_name.clone(),
                avatar_url: avatar_of(author_blog),
                post_id: post_id.clone(),
                post_url: url.clone(),
                tags: tags.clone(),
                is_submission,
                submitted_by: submitted_by.clone(),
                content,
                layout,
            });
        }

        tracing::debug!(
            blog = %blog_name,
            id = %post_id,
            posts = posts.len(),
            "read post payload"
        );

        Ok(ParsedThread {
            posts,
            post_url: url,
            timestamp,
            reblogged_from: str_of(post, "reblogged_from_name"),
            title: str_of(post, "title").filter(|t| !t.trim().is_empty()),
            avatar_url: avatar_of(author_blog),
            tags,
            note_count: post.get("note_count").and_then(Value::as_u64).unwrap_or(0),
            is_submission,
            submitted_by,
            blog_name,
            post_id,
        })
    }

    fn read_trail_item(&mut self, item: &Value) -> Result<Post, ParseError> {
        let blog_name = item
            .pointer("/blog/name")
            .and_then(Value::as_str)
            .or_else(|| item.get("broken_blog_name").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        let post_id = item
            .get("post")
            .and_then(id_of)
            .unwrap_or_default();

        let content = self.read_content(item, &blog_name, &post_id)?;
        let layout = match item.get("layout") {
            Some(layout) => self.read_layout(layout)?,
            None => Vec::new(),
        };

        Ok(Post {
            post_url: post_url(&blog_name, &post_id),
            avatar_url: avatar_of(item.get("blog")),
            blog_name,
            post_id,
            content,
            layout,
            ..Post::default()
        })
    }

    fn read_content(
        &mut self,
        post: &Value,
        blog_name: &str,
        post_id: &str,
    ) -> Result<Vec<Block>, ParseError> {
        let Some(content) = post.get("content") else {
            return Ok(Vec::new());
        };
        let Some(items) = content.as_array() else {
            return Err(ParseError::MalformedPayload(
                "`content` is not an array".to_string(),
            ));
        };
        let context = BlockContext { blog_name, post_id };
        items
            .iter()
            .map(|item| self.parse_block(item, context))
            .collect()
    }

    fn read_layout(&mut self, layout: &Value) -> Result<Vec<LayoutEntry>, ParseError> {
        let Some(entries) = layout.as_array() else {
            self.ignore("layout", "`layout` is not an array");
            return Ok(Vec::new());
        };
        entries
            .iter()
            .map(|entry| self.parse_layout_entry(entry))
            .collect()
    }
}

/// `id_string`, else `id` as a string or number.
fn id_of(value: &Value) -> Option<String> {
    if let Some(id) = value.get("id_string").and_then(Value::as_str) {
        return Some(id.to_string());
    }
    match value.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn top_level_blog_name(post: &Value) -> Option<String> {
    post.get("blog_name")
        .and_then(Value::as_str)
        .or_else(|| post.pointer("/blog/name").and_then(Value::as_str))
        .or_else(|| post.get("broken_blog_name").and_then(Value::as_str))
        .map(str::to_string)
}

fn avatar_of(blog: Option<&Value>) -> Option<String> {
    blog?
        .pointer("/avatar/0/url")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn str_of(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
